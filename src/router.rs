// src/router.rs

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers};

// Monta o router completo. A autenticação fica nos handlers (extrator
// AuthenticatedUser), então não há layer de auth aqui.
pub fn app(app_state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/auth", auth_routes)
        // Clientes
        .route(
            "/clientes",
            get(handlers::clients::list_clients).post(handlers::clients::create_client),
        )
        .route(
            "/clientes/{id}",
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        )
        // Fornecedores
        .route(
            "/fornecedores",
            get(handlers::suppliers::list_suppliers).post(handlers::suppliers::create_supplier),
        )
        .route(
            "/fornecedores/{id}",
            get(handlers::suppliers::get_supplier)
                .put(handlers::suppliers::update_supplier)
                .delete(handlers::suppliers::delete_supplier),
        )
        // Produtos
        .route(
            "/produtos",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/produtos/{id}",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )
        // Vendas
        .route(
            "/vendas",
            get(handlers::sales::list_sales)
                .post(handlers::sales::create_sale)
                .delete(handlers::sales::delete_all_sales),
        )
        .route(
            "/vendas/{id}",
            get(handlers::sales::get_sale).delete(handlers::sales::delete_sale),
        )
        .route("/vendas/{id}/status", put(handlers::sales::update_sale_status))
        // Dashboard
        .route("/dashboard", get(handlers::dashboard::get_dashboard))
        .route(
            "/dashboard/vendas-periodo",
            get(handlers::dashboard::get_sales_by_period),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}
