// src/handlers/clients.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        clients::{Client, ClientDetail, ClientPayload},
        sales::MessageResponse,
    },
};

// GET /clientes
#[utoipa::path(
    get,
    path = "/clientes",
    tag = "Clientes",
    responses(
        (status = 200, description = "Lista de clientes, mais recentes primeiro", body = Vec<Client>),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let clients = app_state
        .client_service
        .list_clients()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(clients))
}

// GET /clientes/{id}
#[utoipa::path(
    get,
    path = "/clientes/{id}",
    tag = "Clientes",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente com suas vendas", body = ClientDetail),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, ApiError> {
    let client = app_state
        .client_service
        .get_client(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(client))
}

// POST /clientes
#[utoipa::path(
    post,
    path = "/clientes",
    tag = "Clientes",
    request_body = ClientPayload,
    responses(
        (status = 201, description = "Cliente criado", body = Client),
        (status = 400, description = "Dados inválidos ou CPF/CNPJ duplicado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    WithRejection(Json(payload), _): WithRejection<Json<ClientPayload>, AppError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let client = app_state
        .client_service
        .create_client(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(client)))
}

// PUT /clientes/{id}
#[utoipa::path(
    put,
    path = "/clientes/{id}",
    tag = "Clientes",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = ClientPayload,
    responses(
        (status = 200, description = "Cliente atualizado", body = Client),
        (status = 400, description = "Dados inválidos ou CPF/CNPJ duplicado"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<ClientPayload>, AppError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let client = app_state
        .client_service
        .update_client(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(client))
}

// DELETE /clientes/{id}
#[utoipa::path(
    delete,
    path = "/clientes/{id}",
    tag = "Clientes",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente excluído", body = MessageResponse),
        (status = 400, description = "Cliente possui vendas"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .client_service
        .delete_client(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let message = if locale.is_english() {
        "Client deleted successfully."
    } else {
        "Cliente excluído com sucesso."
    };
    Ok(Json(MessageResponse {
        message: message.to_string(),
    }))
}
