// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{AuthResponse, Claims, Identity},
};

// ---
// Colaboradores
// ---

/// Hash e verificação de senha. O bcrypt é caro, então roda fora do runtime.
#[async_trait::async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &str) -> Result<String, AppError>;
    async fn verify(&self, password: &str, password_hash: &str) -> Result<bool, AppError>;
}

pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

#[async_trait::async_trait]
impl PasswordHasher for BcryptHasher {
    async fn hash(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_owned();
        let cost = self.cost;
        let hashed = tokio::task::spawn_blocking(move || hash(&password, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(hashed)
    }

    async fn verify(&self, password: &str, password_hash: &str) -> Result<bool, AppError> {
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();
        let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
        Ok(valid)
    }
}

/// Emite e valida tokens de acesso.
pub trait TokenAuthority: Send + Sync {
    fn issue(&self, identity: &Identity) -> Result<String, AppError>;
    fn authenticate(&self, token: &str) -> Result<Identity, AppError>;
}

// JWT HS256 com segredo compartilhado
pub struct JwtAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtAuthority {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }
}

impl TokenAuthority for JwtAuthority {
    fn issue(&self, identity: &Identity) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.ttl;

        let claims = Claims {
            sub: identity.id,
            name: identity.name.clone(),
            email: identity.email.clone(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    fn authenticate(&self, token: &str) -> Result<Identity, AppError> {
        let validation = Validation::new(Algorithm::HS256);
        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| AppError::InvalidToken)?;

        let claims = token_data.claims;
        Ok(Identity {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
        })
    }
}

// ---
// Service
// ---

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenAuthority>,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenAuthority>,
        pool: PgPool,
    ) -> Self {
        Self {
            user_repo,
            hasher,
            tokens,
            pool,
        }
    }

    pub async fn register_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, AppError> {
        // Hashing fora da transação, não toca no banco
        let password_hash = self.hasher.hash(password).await?;

        let mut tx = self.pool.begin().await?;
        let user = self
            .user_repo
            .create_user(&mut *tx, name, email, &password_hash)
            .await?;
        tx.commit().await?;

        tracing::info!("Usuário registrado: {}", user.id);

        let identity = Identity::from(&user);
        let token = self.tokens.issue(&identity)?;
        Ok(AuthResponse {
            token,
            user: identity,
        })
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !self.hasher.verify(password, &user.password_hash).await? {
            tracing::warn!("Tentativa de login com senha incorreta para {}", email);
            return Err(AppError::InvalidCredentials);
        }

        let identity = Identity::from(&user);
        let token = self.tokens.issue(&identity)?;
        Ok(AuthResponse {
            token,
            user: identity,
        })
    }

    /// Valida o Bearer token. Não consulta o banco: a identidade vem das claims.
    pub fn authenticate(&self, token: &str) -> Result<Identity, AppError> {
        self.tokens.authenticate(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn identity() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            name: "Maria Souza".into(),
            email: "maria@empresa.com".into(),
        }
    }

    #[test]
    fn issued_token_authenticates_back_to_the_same_identity() {
        let authority = JwtAuthority::new("segredo-de-teste", Duration::hours(1));
        let who = identity();

        let token = authority.issue(&who).unwrap();
        assert_eq!(authority.authenticate(&token).unwrap(), who);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let issuer = JwtAuthority::new("um-segredo", Duration::hours(1));
        let verifier = JwtAuthority::new("outro-segredo", Duration::hours(1));

        let token = issuer.issue(&identity()).unwrap();
        assert!(matches!(
            verifier.authenticate(&token),
            Err(AppError::InvalidToken)
        ));
        assert!(matches!(
            verifier.authenticate("isto.nao.e-um-jwt"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        // Bem além da tolerância padrão de 60s
        let authority = JwtAuthority::new("segredo-de-teste", Duration::hours(-2));
        let token = authority.issue(&identity()).unwrap();

        assert!(matches!(
            authority.authenticate(&token),
            Err(AppError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn bcrypt_hasher_verifies_only_the_original_password() {
        let hasher = BcryptHasher::new(4);
        let hashed = hasher.hash("senha123").await.unwrap();

        assert_ne!(hashed, "senha123");
        assert!(hasher.verify("senha123", &hashed).await.unwrap());
        assert!(!hasher.verify("senha124", &hashed).await.unwrap());
    }
}
