// src/db/product_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_constraint_error, AppError, Dependents, EntityKind},
    models::{
        products::{Product, ProductPayload, ProductWithSupplierRow},
        sales::{Sale, SaleItem},
    },
};

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---

    pub async fn list_with_supplier(&self) -> Result<Vec<ProductWithSupplierRow>, AppError> {
        let rows = sqlx::query_as::<_, ProductWithSupplierRow>(
            r#"
            SELECT p.*, s.name AS supplier_name
            FROM products p
            JOIN suppliers s ON s.id = p.supplier_id
            ORDER BY p.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    /// Itens de venda que referenciam o produto, mais recentes primeiro.
    pub async fn list_sale_items(&self, product_id: Uuid) -> Result<Vec<SaleItem>, AppError> {
        let items = sqlx::query_as::<_, SaleItem>(
            "SELECT * FROM sale_items WHERE product_id = $1 ORDER BY created_at DESC",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Vendas que contêm o produto.
    pub async fn list_sales_containing(&self, product_id: Uuid) -> Result<Vec<Sale>, AppError> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT * FROM sales
            WHERE id IN (SELECT sale_id FROM sale_items WHERE product_id = $1)
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sales)
    }

    pub async fn has_sale_items<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM sale_items WHERE product_id = $1)")
                .bind(id)
                .fetch_one(executor)
                .await?;
        Ok(exists)
    }

    // ---
    // Escrita (cadastro)
    // ---

    pub async fn create<'e, E>(
        &self,
        executor: E,
        payload: &ProductPayload,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (supplier_id, name, description, price, category, stock)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(payload.supplier_id)
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.price)
        .bind(&payload.category)
        .bind(payload.stock)
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, None, Some(AppError::UnknownReference(EntityKind::Supplier))))
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &ProductPayload,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET supplier_id = $2, name = $3, description = $4, price = $5,
                category = $6, stock = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.supplier_id)
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.price)
        .bind(&payload.category)
        .bind(payload.stock)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_constraint_error(e, None, Some(AppError::UnknownReference(EntityKind::Supplier))))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| {
                map_constraint_error(
                    e,
                    None,
                    Some(AppError::HasDependents {
                        entity: EntityKind::Product,
                        dependents: Dependents::SaleItems,
                    }),
                )
            })?;
        Ok(result.rows_affected())
    }

    // ---
    // Estoque (sempre dentro da transação da venda)
    // ---

    /// Carrega e trava (FOR UPDATE) os produtos da venda, sempre em ordem de id
    /// para que duas vendas concorrentes travem as linhas na mesma sequência.
    pub async fn lock_for_sale<'e, E>(
        &self,
        executor: E,
        ids: &[Uuid],
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(ids)
        .fetch_all(executor)
        .await?;
        Ok(products)
    }

    /// Baixa condicional: só debita se houver saldo. Retorna `false` se não debitou.
    pub async fn decrement_stock<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        quantity: i32,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - $2, updated_at = NOW()
            WHERE id = $1 AND stock >= $2
            "#,
        )
        .bind(id)
        .bind(quantity)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Devolve ao estoque as quantidades dos itens de uma venda.
    pub async fn restore_stock_for_sale<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE products p
            SET stock = p.stock + s.qty, updated_at = NOW()
            FROM (
                SELECT product_id, SUM(quantity)::int AS qty
                FROM sale_items
                WHERE sale_id = $1
                GROUP BY product_id
            ) s
            WHERE p.id = s.product_id
            "#,
        )
        .bind(sale_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Devolve ao estoque as quantidades dos itens das vendas informadas.
    pub async fn restore_stock_for_sales<'e, E>(
        &self,
        executor: E,
        sale_ids: &[Uuid],
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE products p
            SET stock = p.stock + s.qty, updated_at = NOW()
            FROM (
                SELECT product_id, SUM(quantity)::int AS qty
                FROM sale_items
                WHERE sale_id = ANY($1)
                GROUP BY product_id
            ) s
            WHERE p.id = s.product_id
            "#,
        )
        .bind(sale_ids)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
