// src/db/client_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_constraint_error, AppError, Dependents, EntityKind},
    models::{
        clients::{Client, ClientPayload, ClientSummary},
        sales::Sale,
    },
};

#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn list(&self) -> Result<Vec<Client>, AppError> {
        let clients =
            sqlx::query_as::<_, Client>("SELECT * FROM clients ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(clients)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(client)
    }

    pub async fn find_summary<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<ClientSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let summary =
            sqlx::query_as::<_, ClientSummary>("SELECT id, name, email FROM clients WHERE id = $1")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(summary)
    }

    /// Vendas do cliente, mais recentes primeiro.
    pub async fn list_sales(&self, client_id: Uuid) -> Result<Vec<Sale>, AppError> {
        let sales = sqlx::query_as::<_, Sale>(
            "SELECT * FROM sales WHERE client_id = $1 ORDER BY created_at DESC",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sales)
    }

    /// Verifica se o CPF/CNPJ já pertence a outro cliente (ignorando `exclude_id`).
    pub async fn tax_id_taken<'e, E>(
        &self,
        executor: E,
        tax_id: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM clients
                WHERE tax_id = $1 AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(tax_id)
        .bind(exclude_id)
        .fetch_one(executor)
        .await?;
        Ok(taken)
    }

    pub async fn has_sales<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM sales WHERE client_id = $1)")
                .bind(id)
                .fetch_one(executor)
                .await?;
        Ok(exists)
    }

    // =========================================================================
    //  ESCRITA
    // =========================================================================

    pub async fn create<'e, E>(&self, executor: E, payload: &ClientPayload) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (name, email, phone, address, tax_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.address)
        .bind(&payload.tax_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            map_constraint_error(e, Some(AppError::DuplicateTaxId(EntityKind::Client)), None)
        })
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &ClientPayload,
    ) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET name = $2, email = $3, phone = $4, address = $5, tax_id = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.address)
        .bind(&payload.tax_id)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            map_constraint_error(e, Some(AppError::DuplicateTaxId(EntityKind::Client)), None)
        })
    }

    /// Retorna quantas linhas foram removidas (0 ou 1).
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| {
                map_constraint_error(
                    e,
                    None,
                    Some(AppError::HasDependents {
                        entity: EntityKind::Client,
                        dependents: Dependents::Sales,
                    }),
                )
            })?;
        Ok(result.rows_affected())
    }
}
