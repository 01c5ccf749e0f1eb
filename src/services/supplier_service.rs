// src/services/supplier_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::{AppError, Dependents, EntityKind},
    db::SupplierRepository,
    models::suppliers::{Supplier, SupplierDetail, SupplierPayload},
};

#[derive(Clone)]
pub struct SupplierService {
    supplier_repo: SupplierRepository,
    pool: PgPool,
}

impl SupplierService {
    pub fn new(supplier_repo: SupplierRepository, pool: PgPool) -> Self {
        Self {
            supplier_repo,
            pool,
        }
    }

    pub async fn list_suppliers(&self) -> Result<Vec<Supplier>, AppError> {
        self.supplier_repo.list().await
    }

    pub async fn get_supplier(&self, id: Uuid) -> Result<SupplierDetail, AppError> {
        let supplier = self
            .supplier_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound(EntityKind::Supplier))?;

        let products = self.supplier_repo.list_products(id).await?;
        Ok(SupplierDetail { supplier, products })
    }

    pub async fn create_supplier(&self, payload: &SupplierPayload) -> Result<Supplier, AppError> {
        let mut tx = self.pool.begin().await?;

        if self
            .supplier_repo
            .tax_id_taken(&mut *tx, &payload.tax_id, None)
            .await?
        {
            return Err(AppError::DuplicateTaxId(EntityKind::Supplier));
        }

        let supplier = self.supplier_repo.create(&mut *tx, payload).await?;
        tx.commit().await?;

        Ok(supplier)
    }

    pub async fn update_supplier(
        &self,
        id: Uuid,
        payload: &SupplierPayload,
    ) -> Result<Supplier, AppError> {
        let mut tx = self.pool.begin().await?;

        if self.supplier_repo.find_by_id(&mut *tx, id).await?.is_none() {
            return Err(AppError::NotFound(EntityKind::Supplier));
        }

        if self
            .supplier_repo
            .tax_id_taken(&mut *tx, &payload.tax_id, Some(id))
            .await?
        {
            return Err(AppError::DuplicateTaxId(EntityKind::Supplier));
        }

        let supplier = self
            .supplier_repo
            .update(&mut *tx, id, payload)
            .await?
            .ok_or(AppError::NotFound(EntityKind::Supplier))?;
        tx.commit().await?;

        Ok(supplier)
    }

    pub async fn delete_supplier(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        if self.supplier_repo.find_by_id(&mut *tx, id).await?.is_none() {
            return Err(AppError::NotFound(EntityKind::Supplier));
        }

        if self.supplier_repo.has_products(&mut *tx, id).await? {
            tracing::warn!("Exclusão bloqueada: fornecedor {} possui produtos", id);
            return Err(AppError::HasDependents {
                entity: EntityKind::Supplier,
                dependents: Dependents::Products,
            });
        }

        self.supplier_repo.delete(&mut *tx, id).await?;
        tx.commit().await?;

        Ok(())
    }
}
