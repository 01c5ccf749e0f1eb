// src/db/sales_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sales::{Sale, SaleItem, SaleItemRow, SaleStatus, SaleWithClientRow},
};

#[derive(Clone)]
pub struct SalesRepository {
    pool: PgPool,
}

impl SalesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    /// Todas as vendas com o cliente, mais recentes primeiro.
    pub async fn list_with_client(&self) -> Result<Vec<SaleWithClientRow>, AppError> {
        let rows = sqlx::query_as::<_, SaleWithClientRow>(
            r#"
            SELECT s.*, c.name AS client_name, c.email AS client_email
            FROM sales s
            JOIN clients c ON c.id = s.client_id
            ORDER BY s.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_with_client<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<SaleWithClientRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, SaleWithClientRow>(
            r#"
            SELECT s.*, c.name AS client_name, c.email AS client_email
            FROM sales s
            JOIN clients c ON c.id = s.client_id
            WHERE s.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    /// Itens da venda na ordem em que foram enviados.
    pub async fn list_items<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<Vec<SaleItemRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, SaleItemRow>(
            r#"
            SELECT si.*, p.name AS product_name, p.price AS product_price
            FROM sale_items si
            JOIN products p ON p.id = si.product_id
            WHERE si.sale_id = $1
            ORDER BY si.position ASC
            "#,
        )
        .bind(sale_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Itens de várias vendas de uma vez, agrupáveis por `sale_id`.
    pub async fn list_items_for_sales<'e, E>(
        &self,
        executor: E,
        sale_ids: &[Uuid],
    ) -> Result<Vec<SaleItemRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, SaleItemRow>(
            r#"
            SELECT si.*, p.name AS product_name, p.price AS product_price
            FROM sale_items si
            JOIN products p ON p.id = si.product_id
            WHERE si.sale_id = ANY($1)
            ORDER BY si.sale_id, si.position ASC
            "#,
        )
        .bind(sale_ids)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Vendas de um status com cliente (usado pelo painel).
    pub async fn list_by_status<'e, E>(
        &self,
        executor: E,
        status: SaleStatus,
    ) -> Result<Vec<SaleWithClientRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, SaleWithClientRow>(
            r#"
            SELECT s.*, c.name AS client_name, c.email AS client_email
            FROM sales s
            JOIN clients c ON c.id = s.client_id
            WHERE s.status = $1
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Trava a venda (FOR UPDATE) antes de estornar e excluir.
    pub async fn lock<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(sale)
    }

    // =========================================================================
    //  ESCRITA
    // =========================================================================

    /// Cabeçalho da venda; sempre nasce A_PAGAR.
    pub async fn insert_sale<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        total: Decimal,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (client_id, total, status)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(client_id)
        .bind(total)
        .bind(SaleStatus::ToPay)
        .fetch_one(executor)
        .await?;
        Ok(sale)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        product_id: Uuid,
        position: i32,
        quantity: i32,
        unit_price: Decimal,
        subtotal: Decimal,
    ) -> Result<SaleItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, SaleItem>(
            r#"
            INSERT INTO sale_items (sale_id, product_id, position, quantity, unit_price, subtotal)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(sale_id)
        .bind(product_id)
        .bind(position)
        .bind(quantity)
        .bind(unit_price)
        .bind(subtotal)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: SaleStatus,
    ) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            UPDATE sales SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?;
        Ok(sale)
    }

    pub async fn delete_items<'e, E>(&self, executor: E, sale_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM sale_items WHERE sale_id = $1")
            .bind(sale_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Trava todas as vendas existentes e devolve seus ids.
    /// Vendas confirmadas depois disso ficam fora do lote.
    pub async fn lock_all_ids<'e, E>(&self, executor: E) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM sales ORDER BY id FOR UPDATE")
            .fetch_all(executor)
            .await?;
        Ok(ids)
    }

    pub async fn delete_items_for_sales<'e, E>(
        &self,
        executor: E,
        sale_ids: &[Uuid],
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM sale_items WHERE sale_id = ANY($1)")
            .bind(sale_ids)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Remove as vendas informadas. Retorna quantas foram removidas.
    pub async fn delete_many<'e, E>(&self, executor: E, ids: &[Uuid]) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM sales WHERE id = ANY($1)")
            .bind(ids)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
