pub mod user_repo;
pub use user_repo::UserRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod supplier_repo;
pub use supplier_repo::SupplierRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod sales_repo;
pub use sales_repo::SalesRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
