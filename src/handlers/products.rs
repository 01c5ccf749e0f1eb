// src/handlers/products.rs

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
        products::{Product, ProductDetail, ProductListEntry, ProductPayload},
        sales::MessageResponse,
    },
};

// GET /produtos
#[utoipa::path(
    get,
    path = "/produtos",
    tag = "Produtos",
    responses(
        (status = 200, description = "Produtos com o fornecedor", body = Vec<ProductListEntry>),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let products = app_state
        .product_service
        .list_products()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(products))
}

// GET /produtos/{id}
#[utoipa::path(
    get,
    path = "/produtos/{id}",
    tag = "Produtos",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto com fornecedor e itens de venda", body = ProductDetail),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, ApiError> {
    let product = app_state
        .product_service
        .get_product(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(product))
}

// POST /produtos
#[utoipa::path(
    post,
    path = "/produtos",
    tag = "Produtos",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 400, description = "Dados inválidos ou fornecedor inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    WithRejection(Json(payload), _): WithRejection<Json<ProductPayload>, AppError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let product = app_state
        .product_service
        .create_product(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(product)))
}

// PUT /produtos/{id}
#[utoipa::path(
    put,
    path = "/produtos/{id}",
    tag = "Produtos",
    params(("id" = Uuid, Path, description = "ID do produto")),
    request_body = ProductPayload,
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 400, description = "Dados inválidos ou fornecedor inexistente"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<ProductPayload>, AppError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let product = app_state
        .product_service
        .update_product(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(product))
}

// DELETE /produtos/{id}
#[utoipa::path(
    delete,
    path = "/produtos/{id}",
    tag = "Produtos",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto excluído", body = MessageResponse),
        (status = 400, description = "Produto possui itens de venda"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .product_service
        .delete_product(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let message = if locale.is_english() {
        "Product deleted successfully."
    } else {
        "Produto excluído com sucesso."
    };
    Ok(Json(MessageResponse {
        message: message.to_string(),
    }))
}
