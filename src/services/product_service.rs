// src/services/product_service.rs

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::{AppError, Dependents, EntityKind},
    db::{ProductRepository, SupplierRepository},
    models::products::{Product, ProductDetail, ProductListEntry, ProductPayload, ProductSaleItem},
};

#[derive(Clone)]
pub struct ProductService {
    product_repo: ProductRepository,
    supplier_repo: SupplierRepository,
    pool: PgPool,
}

impl ProductService {
    pub fn new(
        product_repo: ProductRepository,
        supplier_repo: SupplierRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            product_repo,
            supplier_repo,
            pool,
        }
    }

    pub async fn list_products(&self) -> Result<Vec<ProductListEntry>, AppError> {
        let rows = self.product_repo.list_with_supplier().await?;
        Ok(rows.into_iter().map(ProductListEntry::from).collect())
    }

    pub async fn get_product(&self, id: Uuid) -> Result<ProductDetail, AppError> {
        let product = self
            .product_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound(EntityKind::Product))?;

        let supplier = self
            .supplier_repo
            .find_by_id(&self.pool, product.supplier_id)
            .await?
            .ok_or(AppError::NotFound(EntityKind::Supplier))?;

        // Cada item vem acompanhado da venda a que pertence
        let sales: HashMap<Uuid, _> = self
            .product_repo
            .list_sales_containing(id)
            .await?
            .into_iter()
            .map(|sale| (sale.id, sale))
            .collect();

        let sale_items = self
            .product_repo
            .list_sale_items(id)
            .await?
            .into_iter()
            .filter_map(|item| {
                let sale = sales.get(&item.sale_id)?.clone();
                Some(ProductSaleItem { item, sale })
            })
            .collect();

        Ok(ProductDetail {
            product,
            supplier,
            sale_items,
        })
    }

    pub async fn create_product(&self, payload: &ProductPayload) -> Result<Product, AppError> {
        let mut tx = self.pool.begin().await?;

        self.ensure_supplier(&mut tx, payload.supplier_id).await?;
        let product = self.product_repo.create(&mut *tx, payload).await?;

        tx.commit().await?;
        Ok(product)
    }

    pub async fn update_product(
        &self,
        id: Uuid,
        payload: &ProductPayload,
    ) -> Result<Product, AppError> {
        let mut tx = self.pool.begin().await?;

        if self.product_repo.find_by_id(&mut *tx, id).await?.is_none() {
            return Err(AppError::NotFound(EntityKind::Product));
        }
        self.ensure_supplier(&mut tx, payload.supplier_id).await?;

        let product = self
            .product_repo
            .update(&mut *tx, id, payload)
            .await?
            .ok_or(AppError::NotFound(EntityKind::Product))?;

        tx.commit().await?;
        Ok(product)
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        if self.product_repo.find_by_id(&mut *tx, id).await?.is_none() {
            return Err(AppError::NotFound(EntityKind::Product));
        }

        if self.product_repo.has_sale_items(&mut *tx, id).await? {
            tracing::warn!("Exclusão bloqueada: produto {} possui itens de venda", id);
            return Err(AppError::HasDependents {
                entity: EntityKind::Product,
                dependents: Dependents::SaleItems,
            });
        }

        self.product_repo.delete(&mut *tx, id).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn ensure_supplier(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        supplier_id: Uuid,
    ) -> Result<(), AppError> {
        self.supplier_repo
            .find_by_id(&mut **tx, supplier_id)
            .await?
            .map(|_| ())
            .ok_or(AppError::UnknownReference(EntityKind::Supplier))
    }
}
