// src/handlers/sales.rs

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
    models::sales::{
        BulkDeleteResponse, CreateSalePayload, MessageResponse, SaleDetail,
        UpdateSaleStatusPayload,
    },
};

// GET /vendas
#[utoipa::path(
    get,
    path = "/vendas",
    tag = "Vendas",
    responses(
        (status = 200, description = "Vendas com cliente e itens, mais recentes primeiro", body = Vec<SaleDetail>),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_sales(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let sales = app_state
        .sales_service
        .list_sales()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(sales))
}

// GET /vendas/{id}
#[utoipa::path(
    get,
    path = "/vendas/{id}",
    tag = "Vendas",
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 200, description = "Venda completa", body = SaleDetail),
        (status = 404, description = "Venda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, ApiError> {
    let sale = app_state
        .sales_service
        .get_sale(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(sale))
}

// POST /vendas
#[utoipa::path(
    post,
    path = "/vendas",
    tag = "Vendas",
    request_body = CreateSalePayload,
    responses(
        (status = 201, description = "Venda registrada e estoque baixado", body = SaleDetail),
        (status = 400, description = "Dados inválidos ou estoque insuficiente"),
        (status = 404, description = "Cliente ou produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    WithRejection(Json(payload), _): WithRejection<Json<CreateSalePayload>, AppError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    tracing::debug!("Usuário {} registrando venda", user.id);

    let sale = app_state
        .sales_service
        .create_sale(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(sale)))
}

// PUT /vendas/{id}/status
#[utoipa::path(
    put,
    path = "/vendas/{id}/status",
    tag = "Vendas",
    params(("id" = Uuid, Path, description = "ID da venda")),
    request_body = UpdateSaleStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = SaleDetail),
        (status = 400, description = "Status diferente de A_PAGAR ou PAGO"),
        (status = 404, description = "Venda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_sale_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateSaleStatusPayload>, AppError>,
) -> Result<impl IntoResponse, ApiError> {
    let sale = app_state
        .sales_service
        .update_status(id, &payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(sale))
}

// DELETE /vendas/{id}
#[utoipa::path(
    delete,
    path = "/vendas/{id}",
    tag = "Vendas",
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 200, description = "Venda excluída e estoque devolvido", body = MessageResponse),
        (status = 404, description = "Venda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .sales_service
        .delete_sale(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let message = if locale.is_english() {
        "Sale deleted and stock restored."
    } else {
        "Venda excluída e estoque devolvido."
    };
    Ok(Json(MessageResponse {
        message: message.to_string(),
    }))
}

// DELETE /vendas
#[utoipa::path(
    delete,
    path = "/vendas",
    tag = "Vendas",
    responses(
        (status = 200, description = "Todas as vendas excluídas e estoque devolvido", body = BulkDeleteResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_all_sales(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = app_state
        .sales_service
        .delete_all_sales()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    tracing::info!("Exclusão em lote de vendas feita por {}", user.email);

    let message = if locale.is_english() {
        format!("{} sale(s) deleted and stock restored.", deleted)
    } else {
        format!("{} venda(s) excluída(s) e estoque devolvido.", deleted)
    };
    Ok(Json(BulkDeleteResponse { message, deleted }))
}
