pub mod auth;
pub mod catalog_service;
pub mod inventory_service;
pub mod pricing_service;
pub mod product_service;
pub mod sales_service;
pub mod tenancy_service;
