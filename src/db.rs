pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod sales_repo;
pub use sales_repo::SalesRepository;
pub mod tenancy_repo;
pub use tenancy_repo::TenancyRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
