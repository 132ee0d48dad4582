// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Health ---
        handlers::health::health_check,

        // --- Auth ---
        handlers::auth::register_owner,
        handlers::auth::login,

        // --- Tenancy ---
        handlers::tenancy::create_company,
        handlers::tenancy::list_companies,
        handlers::tenancy::get_company,
        handlers::tenancy::create_outlet,
        handlers::tenancy::list_outlets,
        handlers::tenancy::get_outlet,
        handlers::tenancy::create_warehouse,
        handlers::tenancy::list_warehouses,
        handlers::tenancy::get_warehouse,

        // --- Catalog ---
        handlers::catalog::create_unit,
        handlers::catalog::list_units,
        handlers::catalog::get_unit,
        handlers::catalog::create_category,
        handlers::catalog::list_categories,
        handlers::catalog::get_category,
        handlers::catalog::create_brand,
        handlers::catalog::list_brands,
        handlers::catalog::get_brand,
        handlers::catalog::create_payment_method,
        handlers::catalog::list_payment_methods,

        // --- Products ---
        handlers::products::list_products,
        handlers::products::create_product,
        handlers::products::create_product_full,
        handlers::products::create_variant,
        handlers::products::add_barcode,

        // --- Inventory ---
        handlers::inventory::get_inventory_by_warehouse,
        handlers::inventory::reconcile_warehouse,
        handlers::inventory::adjust_stock,

        // --- Sales ---
        handlers::sales::create_sale,
        handlers::sales::list_sales,
        handlers::sales::get_sale,
    ),
    components(
        schemas(
            handlers::health::HealthStatus,

            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::LoginUser,
            models::auth::LoginResponse,
            handlers::auth::RegisterOwnerPayload,
            handlers::auth::LoginPayload,

            // --- Tenancy ---
            models::tenancy::Company,
            models::tenancy::Outlet,
            models::tenancy::Warehouse,
            handlers::tenancy::CreateCompanyPayload,
            handlers::tenancy::CreateOutletPayload,
            handlers::tenancy::CreateWarehousePayload,

            // --- Catalog ---
            models::catalog::Unit,
            models::catalog::Category,
            models::catalog::Brand,
            models::catalog::PaymentMethod,
            handlers::catalog::CreateUnitPayload,
            handlers::catalog::CreateCategoryPayload,
            handlers::catalog::CreateNamedPayload,

            // --- Products ---
            models::products::Product,
            models::products::ProductVariant,
            models::products::ProductBarcode,
            models::products::VariantWithBarcodes,
            models::products::ProductWithVariants,
            handlers::products::CreateProductPayload,
            handlers::products::VariantPayload,
            handlers::products::BarcodePayload,
            handlers::products::FullVariantPayload,
            handlers::products::CreateProductFullPayload,
            handlers::products::CreateVariantPayload,
            handlers::products::AddBarcodePayload,

            // --- Inventory ---
            models::inventory::StockRefType,
            models::inventory::InventoryBalance,
            models::inventory::StockMovement,
            models::inventory::StockMovementLine,
            models::inventory::InventoryRow,
            models::inventory::BalanceDrift,
            models::inventory::StockAdjusted,
            handlers::inventory::AdjustLinePayload,
            handlers::inventory::AdjustStockPayload,

            // --- Sales ---
            models::sales::SaleStatus,
            models::sales::SaleCreated,
            models::sales::SaleListItem,
            models::sales::SaleHeader,
            models::sales::SaleDetailLine,
            models::sales::SaleDetailPayment,
            models::sales::SaleDetail,
            handlers::sales::SaleItemPayload,
            handlers::sales::SalePaymentPayload,
            handlers::sales::CreateSalePayload,
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Auth", description = "Owner registration and login"),
        (name = "Companies", description = "Tenant bootstrap and lookup"),
        (name = "Outlets", description = "Points of sale of a company"),
        (name = "Warehouses", description = "Stock locations attached to outlets"),
        (name = "Catalog", description = "Units, categories, brands and payment methods"),
        (name = "Products", description = "Products, variants and barcodes"),
        (name = "Inventory", description = "Stock balances, adjustments and ledger reconciliation"),
        (name = "Sales", description = "Point-of-sale transactions")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("api_jwt", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_group_is_documented() {
        let doc = ApiDoc::openapi();
        for path in ["/health", "/sales", "/sales/{id}", "/inventory/adjust", "/products/full"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        assert!(doc
            .components
            .as_ref()
            .is_some_and(|c| c.security_schemes.contains_key("api_jwt")));
    }
}
