pub mod auth;
pub mod catalog;
pub mod inventory;
pub mod products;
pub mod sales;
pub mod tenancy;
