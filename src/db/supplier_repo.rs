// src/db/supplier_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_constraint_error, AppError, Dependents, EntityKind},
    models::{
        products::Product,
        suppliers::{Supplier, SupplierPayload},
    },
};

#[derive(Clone)]
pub struct SupplierRepository {
    pool: PgPool,
}

impl SupplierRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Supplier>, AppError> {
        let suppliers =
            sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(suppliers)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(supplier)
    }

    pub async fn list_products(&self, supplier_id: Uuid) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE supplier_id = $1 ORDER BY name ASC",
        )
        .bind(supplier_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

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
                SELECT 1 FROM suppliers
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

    pub async fn has_products<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE supplier_id = $1)")
                .bind(id)
                .fetch_one(executor)
                .await?;
        Ok(exists)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        payload: &SupplierPayload,
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (name, email, phone, address, tax_id)
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
            map_constraint_error(e, Some(AppError::DuplicateTaxId(EntityKind::Supplier)), None)
        })
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &SupplierPayload,
    ) -> Result<Option<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers
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
            map_constraint_error(e, Some(AppError::DuplicateTaxId(EntityKind::Supplier)), None)
        })
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| {
                map_constraint_error(
                    e,
                    None,
                    Some(AppError::HasDependents {
                        entity: EntityKind::Supplier,
                        dependents: Dependents::Products,
                    }),
                )
            })?;
        Ok(result.rows_affected())
    }
}
