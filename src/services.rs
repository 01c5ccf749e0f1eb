pub mod auth;
pub mod client_service;
pub mod dashboard_service;
pub mod product_service;
pub mod sales_service;
pub mod supplier_service;
