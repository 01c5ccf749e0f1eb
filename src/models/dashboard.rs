// src/models/dashboard.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::models::{products::Product, sales::SaleWithClient};

// 1. Cards do topo
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_to_pay: Decimal, // Soma das vendas A_PAGAR
    pub total_paid: Decimal,   // Soma das vendas PAGO
    pub total_clients: i64,
    pub total_suppliers: i64,
    pub total_products: i64,
    pub total_sales: i64,
}

// 2. Produtos com estoque abaixo do limite
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LowStockProduct {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub product: Product,
    pub supplier_name: String,
}

// 3. Gráfico mensal (últimos 6 meses)
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySales {
    #[schema(example = "2025-03")]
    pub month: String,
    pub total: Decimal,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub summary: DashboardSummary,
    pub sales_to_pay: Vec<SaleWithClient>,
    pub sales_paid: Vec<SaleWithClient>,
    pub low_stock_products: Vec<LowStockProduct>,
    pub monthly_sales: Vec<MonthlySales>,
}

// --- Relatório por período ---

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PeriodQuery {
    /// Data inicial (YYYY-MM-DD)
    pub inicio: Option<String>,
    /// Data final, inclusiva (YYYY-MM-DD)
    pub fim: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PeriodBounds {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Default, Serialize, FromRow, ToSchema)]
pub struct StatusTotals {
    pub count: i64,
    pub total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReport {
    pub period: PeriodBounds,
    pub total_sales: i64,
    pub total_revenue: Decimal,
    pub paid: StatusTotals,
    pub to_pay: StatusTotals,
}
