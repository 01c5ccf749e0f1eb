// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::dashboard::{DashboardData, PeriodQuery, PeriodReport},
};

// GET /dashboard
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Totais, vendas por status, estoque baixo e gráfico mensal", body = DashboardData),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let data = app_state
        .dashboard_service
        .get_dashboard()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(data))
}

// GET /dashboard/vendas-periodo?inicio=YYYY-MM-DD&fim=YYYY-MM-DD
#[utoipa::path(
    get,
    path = "/dashboard/vendas-periodo",
    tag = "Dashboard",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Totais de vendas no período", body = PeriodReport),
        (status = 400, description = "Datas inválidas")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_sales_by_period(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    WithRejection(Query(query), _): WithRejection<Query<PeriodQuery>, AppError>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .dashboard_service
        .get_period_report(&query)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(report))
}
