use std::collections::HashMap;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::middleware::i18n::Locale;

/// Entidades do domínio, usadas para montar mensagens de erro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Client,
    Supplier,
    Product,
    Sale,
}

impl EntityKind {
    fn not_found(self, locale: &Locale) -> &'static str {
        match (self, locale.is_english()) {
            (EntityKind::Client, false) => "Cliente não encontrado.",
            (EntityKind::Supplier, false) => "Fornecedor não encontrado.",
            (EntityKind::Product, false) => "Produto não encontrado.",
            (EntityKind::Sale, false) => "Venda não encontrada.",
            (EntityKind::Client, true) => "Client not found.",
            (EntityKind::Supplier, true) => "Supplier not found.",
            (EntityKind::Product, true) => "Product not found.",
            (EntityKind::Sale, true) => "Sale not found.",
        }
    }

    fn label(self, locale: &Locale) -> &'static str {
        match (self, locale.is_english()) {
            (EntityKind::Client, false) => "o cliente",
            (EntityKind::Supplier, false) => "o fornecedor",
            (EntityKind::Product, false) => "o produto",
            (EntityKind::Sale, false) => "a venda",
            (EntityKind::Client, true) => "client",
            (EntityKind::Supplier, true) => "supplier",
            (EntityKind::Product, true) => "product",
            (EntityKind::Sale, true) => "sale",
        }
    }
}

/// Relação dependente que impede a exclusão de um registro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependents {
    Sales,
    Products,
    SaleItems,
}

impl Dependents {
    fn label(self, locale: &Locale) -> &'static str {
        match (self, locale.is_english()) {
            (Dependents::Sales, false) => "vendas associadas",
            (Dependents::Products, false) => "produtos associados",
            (Dependents::SaleItems, false) => "itens de venda associados",
            (Dependents::Sales, true) => "associated sales",
            (Dependents::Products, true) => "associated products",
            (Dependents::SaleItems, true) => "associated sale items",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Requisição inválida: {0}")]
    InvalidInput(String),

    #[error("Documento já cadastrado para {0:?}")]
    DuplicateTaxId(EntityKind),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Status de venda inválido: {0}")]
    InvalidSaleStatus(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("{entity:?} possui {dependents:?}")]
    HasDependents {
        entity: EntityKind,
        dependents: Dependents,
    },

    #[error("Estoque insuficiente para {product}: solicitado {requested}, disponível {available}")]
    InsufficientStock {
        product: String,
        requested: i64,
        available: i64,
    },

    #[error("Token inválido")]
    InvalidToken,

    #[error("{0:?} não encontrado")]
    NotFound(EntityKind),

    // Registro referenciado no corpo da requisição que não existe
    #[error("{0:?} referenciado não existe")]
    UnknownReference(EntityKind),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

/// Erro já traduzido, pronto para virar resposta HTTP.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidInput(_)
            | AppError::DuplicateTaxId(_)
            | AppError::EmailAlreadyExists
            | AppError::InvalidSaleStatus(_)
            | AppError::InvalidCredentials
            | AppError::HasDependents { .. }
            | AppError::InsufficientStock { .. }
            | AppError::UnknownReference(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro de domínio na resposta localizada.
    /// Erros internos são logados aqui e nunca expõem detalhes ao cliente.
    pub fn to_api_error(self, locale: &Locale) -> ApiError {
        let status = self.status_code();
        let en = locale.is_english();

        let (error, details) = match self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let msg = if en {
                    "One or more fields are invalid."
                } else {
                    "Um ou mais campos são inválidos."
                };
                (msg.to_string(), Some(json!(details)))
            }
            AppError::InvalidInput(detail) => {
                let msg = if en {
                    format!("Invalid request: {}", detail)
                } else {
                    format!("Requisição inválida: {}", detail)
                };
                (msg, None)
            }
            AppError::DuplicateTaxId(kind) => {
                let msg = match (kind, en) {
                    (EntityKind::Client, false) => "Já existe um cliente com este CPF/CNPJ.",
                    (EntityKind::Supplier, false) => "Já existe um fornecedor com este CNPJ.",
                    (_, false) => "Documento já cadastrado.",
                    (EntityKind::Client, true) => "A client with this tax id already exists.",
                    (EntityKind::Supplier, true) => "A supplier with this tax id already exists.",
                    (_, true) => "Tax id already registered.",
                };
                (msg.to_string(), None)
            }
            AppError::EmailAlreadyExists => {
                let msg = if en {
                    "A user with this e-mail already exists."
                } else {
                    "Já existe um usuário com este e-mail."
                };
                (msg.to_string(), None)
            }
            AppError::InvalidSaleStatus(value) => {
                let msg = if en {
                    format!("Invalid status '{}'. Use A_PAGAR or PAGO.", value)
                } else {
                    format!("Status inválido '{}'. Use A_PAGAR ou PAGO.", value)
                };
                (msg, None)
            }
            AppError::InvalidCredentials => {
                let msg = if en { "Invalid credentials." } else { "Credenciais inválidas." };
                (msg.to_string(), None)
            }
            AppError::HasDependents { entity, dependents } => {
                let msg = if en {
                    format!(
                        "Cannot delete {}: it has {}.",
                        entity.label(locale),
                        dependents.label(locale)
                    )
                } else {
                    format!(
                        "Não é possível excluir {}: existem {}.",
                        entity.label(locale),
                        dependents.label(locale)
                    )
                };
                (msg, None)
            }
            AppError::InsufficientStock {
                product,
                requested,
                available,
            } => {
                let msg = if en {
                    format!(
                        "Insufficient stock for product {} (requested: {}, available: {}).",
                        product, requested, available
                    )
                } else {
                    format!(
                        "Estoque insuficiente para o produto {} (solicitado: {}, disponível: {}).",
                        product, requested, available
                    )
                };
                (msg, None)
            }
            AppError::InvalidToken => {
                let msg = if en {
                    "Missing or invalid authentication token."
                } else {
                    "Token de autenticação inválido ou ausente."
                };
                (msg.to_string(), None)
            }
            AppError::NotFound(kind) | AppError::UnknownReference(kind) => {
                (kind.not_found(locale).to_string(), None)
            }
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                let msg = if en {
                    "Internal server error."
                } else {
                    "Erro interno do servidor."
                };
                (msg.to_string(), None)
            }
        };

        ApiError {
            status,
            error,
            details,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        err.to_api_error(&Locale::default())
    }
}

// Usado diretamente pelos extratores (WithRejection, AuthenticatedUser),
// que não conhecem o idioma da requisição.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

// numeric_value_out_of_range
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// Traduz violações de integridade do Postgres para o domínio.
/// `unique` e `foreign` são os erros a devolver em cada caso.
/// Valor numérico fora da precisão da coluna vira `InvalidInput`.
pub(crate) fn map_constraint_error(
    err: sqlx::Error,
    unique: Option<AppError>,
    foreign: Option<AppError>,
) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE) {
            return AppError::InvalidInput(
                "valor numérico excede a precisão permitida".to_string(),
            );
        }
        if db_err.is_unique_violation() {
            if let Some(mapped) = unique {
                return mapped;
            }
        }
        if db_err.is_foreign_key_violation() {
            if let Some(mapped) = foreign {
                return mapped;
            }
        }
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "O nome é obrigatório."))]
        name: String,
    }

    #[test]
    fn business_rule_failures_are_bad_requests() {
        let conflict = AppError::HasDependents {
            entity: EntityKind::Client,
            dependents: Dependents::Sales,
        };
        assert_eq!(conflict.status_code(), StatusCode::BAD_REQUEST);

        let stock = AppError::InsufficientStock {
            product: "Caneta".into(),
            requested: 5,
            available: 2,
        };
        assert_eq!(stock.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::InvalidSaleStatus("CANCELADO".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::DuplicateTaxId(EntityKind::Supplier).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn not_found_and_auth_map_to_their_codes() {
        assert_eq!(
            AppError::NotFound(EntityKind::Sale).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::UnknownReference(EntityKind::Supplier).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn conflict_message_names_the_dependent_relation() {
        let err = AppError::HasDependents {
            entity: EntityKind::Product,
            dependents: Dependents::SaleItems,
        };
        let api = err.to_api_error(&Locale::default());
        assert!(api.error.contains("itens de venda"), "{}", api.error);

        let err = AppError::HasDependents {
            entity: EntityKind::Supplier,
            dependents: Dependents::Products,
        };
        let api = err.to_api_error(&Locale("en".into()));
        assert_eq!(api.error, "Cannot delete supplier: it has associated products.");
    }

    #[test]
    fn unknown_reference_reuses_the_not_found_message() {
        let api = AppError::UnknownReference(EntityKind::Supplier).to_api_error(&Locale::default());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.error, "Fornecedor não encontrado.");
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let err = AppError::InternalServerError(anyhow::anyhow!("senha do banco: hunter2"));
        let api = err.to_api_error(&Locale::default());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("hunter2"));
        assert!(api.details.is_none());
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let errors = Sample { name: String::new() }.validate().unwrap_err();
        let api = AppError::ValidationError(errors).to_api_error(&Locale::default());
        let details = api.details.expect("details");
        assert_eq!(details["name"][0], "O nome é obrigatório.");
    }
}
