// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        ClientRepository, DashboardRepository, ProductRepository, SalesRepository,
        SupplierRepository, UserRepository,
    },
    services::{
        auth::{AuthService, BcryptHasher, JwtAuthority},
        client_service::ClientService,
        dashboard_service::DashboardService,
        product_service::ProductService,
        sales_service::SalesService,
        supplier_service::SupplierService,
    },
};

// Configuração lida do ambiente (.env em desenvolvimento)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        Ok(Self {
            database_url,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5)?,
            jwt_secret,
            jwt_expiration_hours: parse_or("JWT_EXPIRATION_HOURS", 1)?,
            host: env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("APP_PORT", 3000)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{} inválida: '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}

// O estado compartilhado, clonado a cada requisição
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub client_service: ClientService,
    pub supplier_service: SupplierService,
    pub product_service: ProductService,
    pub sales_service: SalesService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, config))
    }

    /// Monta o gráfico de dependências sobre um pool já criado.
    pub fn from_pool(db_pool: PgPool, config: &Config) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let client_repo = ClientRepository::new(db_pool.clone());
        let supplier_repo = SupplierRepository::new(db_pool.clone());
        let product_repo = ProductRepository::new(db_pool.clone());
        let sales_repo = SalesRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new();

        let auth_service = AuthService::new(
            user_repo,
            Arc::new(BcryptHasher::default()),
            Arc::new(JwtAuthority::new(
                &config.jwt_secret,
                chrono::Duration::hours(config.jwt_expiration_hours),
            )),
            db_pool.clone(),
        );
        let client_service = ClientService::new(client_repo.clone(), db_pool.clone());
        let supplier_service = SupplierService::new(supplier_repo.clone(), db_pool.clone());
        let product_service =
            ProductService::new(product_repo.clone(), supplier_repo, db_pool.clone());
        let sales_service = SalesService::new(
            sales_repo.clone(),
            client_repo,
            product_repo,
            db_pool.clone(),
        );
        let dashboard_service = DashboardService::new(dashboard_repo, sales_repo, db_pool.clone());

        Self {
            db_pool,
            auth_service,
            client_service,
            supplier_service,
            product_service,
            sales_service,
            dashboard_service,
        }
    }
}
