// src/services/client_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::{AppError, Dependents, EntityKind},
    db::ClientRepository,
    models::clients::{Client, ClientDetail, ClientPayload},
};

#[derive(Clone)]
pub struct ClientService {
    client_repo: ClientRepository,
    pool: PgPool,
}

impl ClientService {
    pub fn new(client_repo: ClientRepository, pool: PgPool) -> Self {
        Self { client_repo, pool }
    }

    pub async fn list_clients(&self) -> Result<Vec<Client>, AppError> {
        self.client_repo.list().await
    }

    pub async fn get_client(&self, id: Uuid) -> Result<ClientDetail, AppError> {
        let client = self
            .client_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound(EntityKind::Client))?;

        let sales = self.client_repo.list_sales(id).await?;
        Ok(ClientDetail { client, sales })
    }

    pub async fn create_client(&self, payload: &ClientPayload) -> Result<Client, AppError> {
        let mut tx = self.pool.begin().await?;

        if self
            .client_repo
            .tax_id_taken(&mut *tx, &payload.tax_id, None)
            .await?
        {
            return Err(AppError::DuplicateTaxId(EntityKind::Client));
        }

        let client = self.client_repo.create(&mut *tx, payload).await?;
        tx.commit().await?;

        Ok(client)
    }

    pub async fn update_client(
        &self,
        id: Uuid,
        payload: &ClientPayload,
    ) -> Result<Client, AppError> {
        let mut tx = self.pool.begin().await?;

        if self.client_repo.find_by_id(&mut *tx, id).await?.is_none() {
            return Err(AppError::NotFound(EntityKind::Client));
        }

        // Compara só com os outros clientes
        if self
            .client_repo
            .tax_id_taken(&mut *tx, &payload.tax_id, Some(id))
            .await?
        {
            return Err(AppError::DuplicateTaxId(EntityKind::Client));
        }

        let client = self
            .client_repo
            .update(&mut *tx, id, payload)
            .await?
            .ok_or(AppError::NotFound(EntityKind::Client))?;
        tx.commit().await?;

        Ok(client)
    }

    pub async fn delete_client(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        if self.client_repo.find_by_id(&mut *tx, id).await?.is_none() {
            return Err(AppError::NotFound(EntityKind::Client));
        }

        if self.client_repo.has_sales(&mut *tx, id).await? {
            tracing::warn!("Exclusão bloqueada: cliente {} possui vendas", id);
            return Err(AppError::HasDependents {
                entity: EntityKind::Client,
                dependents: Dependents::Sales,
            });
        }

        self.client_repo.delete(&mut *tx, id).await?;
        tx.commit().await?;

        Ok(())
    }
}
