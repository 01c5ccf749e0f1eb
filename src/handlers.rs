pub mod auth;
pub mod clients;
pub mod dashboard;
pub mod products;
pub mod sales;
pub mod suppliers;
