// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Clientes ---
        handlers::clients::list_clients,
        handlers::clients::get_client,
        handlers::clients::create_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,

        // --- Fornecedores ---
        handlers::suppliers::list_suppliers,
        handlers::suppliers::get_supplier,
        handlers::suppliers::create_supplier,
        handlers::suppliers::update_supplier,
        handlers::suppliers::delete_supplier,

        // --- Produtos ---
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,

        // --- Vendas ---
        handlers::sales::list_sales,
        handlers::sales::get_sale,
        handlers::sales::create_sale,
        handlers::sales::update_sale_status,
        handlers::sales::delete_sale,
        handlers::sales::delete_all_sales,

        // --- Dashboard ---
        handlers::dashboard::get_dashboard,
        handlers::dashboard::get_sales_by_period,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Identity,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Clientes ---
            models::clients::Client,
            models::clients::ClientSummary,
            models::clients::ClientDetail,
            models::clients::ClientPayload,

            // --- Fornecedores ---
            models::suppliers::Supplier,
            models::suppliers::SupplierRef,
            models::suppliers::SupplierDetail,
            models::suppliers::SupplierPayload,

            // --- Produtos ---
            models::products::Product,
            models::products::ProductSummary,
            models::products::ProductListEntry,
            models::products::ProductSaleItem,
            models::products::ProductDetail,
            models::products::ProductPayload,

            // --- Vendas ---
            models::sales::SaleStatus,
            models::sales::Sale,
            models::sales::SaleItem,
            models::sales::SaleItemDetail,
            models::sales::SaleWithClient,
            models::sales::SaleDetail,
            models::sales::SaleLinePayload,
            models::sales::CreateSalePayload,
            models::sales::UpdateSaleStatusPayload,
            models::sales::MessageResponse,
            models::sales::BulkDeleteResponse,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
            models::dashboard::LowStockProduct,
            models::dashboard::MonthlySales,
            models::dashboard::DashboardData,
            models::dashboard::PeriodBounds,
            models::dashboard::StatusTotals,
            models::dashboard::PeriodReport,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Clientes", description = "Cadastro de Clientes"),
        (name = "Fornecedores", description = "Cadastro de Fornecedores"),
        (name = "Produtos", description = "Produtos e Estoque"),
        (name = "Vendas", description = "Vendas, Itens e Baixa de Estoque"),
        (name = "Dashboard", description = "Indicadores e Gráficos Gerenciais")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
