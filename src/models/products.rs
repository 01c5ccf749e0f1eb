// src/models/products.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{
    sales::{Sale, SaleItem},
    suppliers::{Supplier, SupplierRef},
};

/// Abaixo deste estoque o produto aparece no dashboard.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// Maior preço que cabe em `products.price` (NUMERIC(12,2)).
pub fn max_price() -> Decimal {
    Decimal::new(9_999_999_999_99, 2)
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub supplier_id: Uuid,
    #[schema(example = "Caneta Azul")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "2.50")]
    pub price: Decimal,
    #[schema(example = "Papelaria")]
    pub category: Option<String>,
    #[schema(example = 42)]
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Resumo do produto embutido nos itens de venda.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
}

// Linha do banco: produto + nome do fornecedor (JOIN)
#[derive(Debug, Clone, FromRow)]
pub struct ProductWithSupplierRow {
    #[sqlx(flatten)]
    pub product: Product,
    pub supplier_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductListEntry {
    #[serde(flatten)]
    pub product: Product,
    pub supplier: SupplierRef,
}

impl From<ProductWithSupplierRow> for ProductListEntry {
    fn from(row: ProductWithSupplierRow) -> Self {
        let supplier = SupplierRef {
            id: row.product.supplier_id,
            name: row.supplier_name,
        };
        Self {
            product: row.product,
            supplier,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSaleItem {
    #[serde(flatten)]
    pub item: SaleItem,
    pub sale: Sale,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub supplier: Supplier,
    pub sale_items: Vec<ProductSaleItem>,
}

fn validate_price(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    if *val > max_price() {
        let mut err = ValidationError::new("range");
        err.add_param("max".into(), &max_price().to_string());
        err.message = Some("O preço excede o valor máximo permitido.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Caneta Azul")]
    pub name: String,

    pub description: Option<String>,

    #[validate(custom(function = "validate_price"))]
    #[schema(example = "2.50")]
    pub price: Decimal,

    pub category: Option<String>,

    #[validate(range(min = 0, message = "O estoque não pode ser negativo."))]
    #[serde(default)]
    #[schema(example = 42)]
    pub stock: i32,

    pub supplier_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).expect("decimal")
    }

    fn payload(price: &str, stock: i32) -> ProductPayload {
        ProductPayload {
            name: "Caneta".into(),
            description: None,
            price: dec(price),
            category: None,
            stock,
            supplier_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn rejects_negative_price_and_stock() {
        assert!(payload("2.50", 10).validate().is_ok());
        assert!(payload("0", 0).validate().is_ok());

        let errors = payload("-1", 10).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));

        let errors = payload("1", -3).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("stock"));
    }

    #[test]
    fn price_must_fit_the_column() {
        assert!(payload("9999999999.99", 1).validate().is_ok());

        let errors = payload("10000000000", 1).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));
    }
}
