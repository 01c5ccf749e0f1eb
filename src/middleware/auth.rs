// src/middleware/auth.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{common::error::AppError, config::AppState, models::auth::Identity};

// Extrator para obter o usuário autenticado diretamente nos handlers.
// Lê o `Authorization: Bearer <token>` e valida pelo AuthService; sem header ou
// com token inválido/expirado a requisição para aqui com 401.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::InvalidToken)?;

        let app_state = AppState::from_ref(state);
        let identity = app_state.auth_service.authenticate(bearer.token())?;

        Ok(AuthenticatedUser(identity))
    }
}
