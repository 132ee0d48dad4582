pub mod auth;
pub mod catalog;
pub mod health;
pub mod inventory;
pub mod products;
pub mod sales;
pub mod tenancy;
mod validators;
