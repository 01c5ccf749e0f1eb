// src/models/sales.rs

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    models::{clients::ClientSummary, products::ProductSummary},
};

// Mapeia o CREATE TYPE sale_status do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sale_status")]
pub enum SaleStatus {
    #[sqlx(rename = "A_PAGAR")]
    #[serde(rename = "A_PAGAR")]
    ToPay,
    #[sqlx(rename = "PAGO")]
    #[serde(rename = "PAGO")]
    Paid,
}

impl FromStr for SaleStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "A_PAGAR" => Ok(SaleStatus::ToPay),
            "PAGO" => Ok(SaleStatus::Paid),
            other => Err(AppError::InvalidSaleStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    pub client_id: Uuid,
    #[schema(example = "150.50")]
    pub total: Decimal,
    pub status: SaleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub position: i32,
    #[schema(example = 2)]
    pub quantity: i32,
    // Preço congelado no momento da venda
    #[schema(example = "50.00")]
    pub unit_price: Decimal,
    #[schema(example = "100.00")]
    pub subtotal: Decimal,
    pub created_at: DateTime<Utc>,
}

// Linha do banco: item + dados atuais do produto (JOIN)
#[derive(Debug, Clone, FromRow)]
pub struct SaleItemRow {
    #[sqlx(flatten)]
    pub item: SaleItem,
    pub product_name: String,
    pub product_price: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemDetail {
    #[serde(flatten)]
    pub item: SaleItem,
    pub product: ProductSummary,
}

impl From<SaleItemRow> for SaleItemDetail {
    fn from(row: SaleItemRow) -> Self {
        let product = ProductSummary {
            id: row.item.product_id,
            name: row.product_name,
            price: row.product_price,
        };
        Self {
            item: row.item,
            product,
        }
    }
}

// Linha do banco: venda + dados do cliente (JOIN)
#[derive(Debug, Clone, FromRow)]
pub struct SaleWithClientRow {
    #[sqlx(flatten)]
    pub sale: Sale,
    pub client_name: String,
    pub client_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleWithClient {
    #[serde(flatten)]
    pub sale: Sale,
    pub client: ClientSummary,
}

impl From<SaleWithClientRow> for SaleWithClient {
    fn from(row: SaleWithClientRow) -> Self {
        let client = ClientSummary {
            id: row.sale.client_id,
            name: row.client_name,
            email: row.client_email,
        };
        Self {
            sale: row.sale,
            client,
        }
    }
}

/// Venda completa: cabeçalho, cliente e itens com produto.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: Sale,
    pub client: ClientSummary,
    pub items: Vec<SaleItemDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleLinePayload {
    pub product_id: Uuid,

    #[validate(range(min = 1, message = "A quantidade deve ser maior que zero."))]
    #[schema(example = 2)]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalePayload {
    pub client_id: Uuid,

    #[validate(length(min = 1, message = "A venda precisa de pelo menos um item."), nested)]
    pub items: Vec<SaleLinePayload>,
}

// O status chega como texto livre para que valores inválidos virem erro de validação
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSaleStatusPayload {
    #[schema(example = "PAGO")]
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkDeleteResponse {
    pub message: String,
    pub deleted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_accepts_only_known_values() {
        assert_eq!("A_PAGAR".parse::<SaleStatus>().unwrap(), SaleStatus::ToPay);
        assert_eq!("PAGO".parse::<SaleStatus>().unwrap(), SaleStatus::Paid);

        for invalid in ["pago", "CANCELADO", "", " PAGO"] {
            let err = invalid.parse::<SaleStatus>().unwrap_err();
            assert!(matches!(err, AppError::InvalidSaleStatus(ref v) if v == invalid));
        }
    }

    #[test]
    fn status_serializes_with_wire_names() {
        assert_eq!(serde_json::to_value(SaleStatus::ToPay).unwrap(), "A_PAGAR");
        assert_eq!(serde_json::to_value(SaleStatus::Paid).unwrap(), "PAGO");
    }

    #[test]
    fn empty_sale_fails_validation() {
        let payload = CreateSalePayload {
            client_id: Uuid::new_v4(),
            items: vec![],
        };
        assert!(payload.validate().is_err());

        let payload = CreateSalePayload {
            client_id: Uuid::new_v4(),
            items: vec![SaleLinePayload {
                product_id: Uuid::new_v4(),
                quantity: 0,
            }],
        };
        assert!(payload.validate().is_err());
    }
}
