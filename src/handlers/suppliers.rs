// src/handlers/suppliers.rs

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
        sales::MessageResponse,
        suppliers::{Supplier, SupplierDetail, SupplierPayload},
    },
};

// GET /fornecedores
#[utoipa::path(
    get,
    path = "/fornecedores",
    tag = "Fornecedores",
    responses(
        (status = 200, description = "Lista de fornecedores", body = Vec<Supplier>),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_suppliers(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let suppliers = app_state
        .supplier_service
        .list_suppliers()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(suppliers))
}

// GET /fornecedores/{id}
#[utoipa::path(
    get,
    path = "/fornecedores/{id}",
    tag = "Fornecedores",
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    responses(
        (status = 200, description = "Fornecedor com seus produtos", body = SupplierDetail),
        (status = 404, description = "Fornecedor não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_supplier(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, ApiError> {
    let supplier = app_state
        .supplier_service
        .get_supplier(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(supplier))
}

// POST /fornecedores
#[utoipa::path(
    post,
    path = "/fornecedores",
    tag = "Fornecedores",
    request_body = SupplierPayload,
    responses(
        (status = 201, description = "Fornecedor criado", body = Supplier),
        (status = 400, description = "Dados inválidos ou CNPJ duplicado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_supplier(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    WithRejection(Json(payload), _): WithRejection<Json<SupplierPayload>, AppError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let supplier = app_state
        .supplier_service
        .create_supplier(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(supplier)))
}

// PUT /fornecedores/{id}
#[utoipa::path(
    put,
    path = "/fornecedores/{id}",
    tag = "Fornecedores",
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    request_body = SupplierPayload,
    responses(
        (status = 200, description = "Fornecedor atualizado", body = Supplier),
        (status = 400, description = "Dados inválidos ou CNPJ duplicado"),
        (status = 404, description = "Fornecedor não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_supplier(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<SupplierPayload>, AppError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let supplier = app_state
        .supplier_service
        .update_supplier(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(supplier))
}

// DELETE /fornecedores/{id}
#[utoipa::path(
    delete,
    path = "/fornecedores/{id}",
    tag = "Fornecedores",
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    responses(
        (status = 200, description = "Fornecedor excluído", body = MessageResponse),
        (status = 400, description = "Fornecedor possui produtos"),
        (status = 404, description = "Fornecedor não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_supplier(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .supplier_service
        .delete_supplier(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let message = if locale.is_english() {
        "Supplier deleted successfully."
    } else {
        "Fornecedor excluído com sucesso."
    };
    Ok(Json(MessageResponse {
        message: message.to_string(),
    }))
}
