// src/handlers/products.rs

use axum::{extract::State, response::IntoResponse, Json};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::validators::not_negative;
use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::{
        rbac::{OwnerOnly, RequireRole},
        tenancy::TenantContext,
    },
    models::products::{
        NewBarcode, NewProduct, NewVariant, NewVariantWithBarcodes, Product, ProductBarcode,
        ProductVariant, ProductWithVariants,
    },
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,

    #[validate(length(min = 1, message = "name is required"))]
    #[schema(example = "Kopi Susu")]
    pub name: String,

    pub code: Option<String>,
    pub description: Option<String>,

    #[serde(default)]
    pub is_service: bool,
}

impl From<&CreateProductPayload> for NewProduct {
    fn from(p: &CreateProductPayload) -> Self {
        Self {
            category_id: p.category_id,
            brand_id: p.brand_id,
            name: p.name.clone(),
            code: p.code.clone(),
            description: p.description.clone(),
            is_service: p.is_service,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariantPayload {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub unit_id: Option<Uuid>,

    // Missing prices default to 0
    #[serde(default)]
    #[validate(custom(function = "not_negative"))]
    #[schema(example = 12000.0)]
    pub cost_price: Decimal,

    #[serde(default)]
    #[validate(custom(function = "not_negative"))]
    #[schema(example = 15000.0)]
    pub sell_price: Decimal,
}

impl From<&VariantPayload> for NewVariant {
    fn from(p: &VariantPayload) -> Self {
        Self {
            name: p.name.clone(),
            sku: p.sku.clone(),
            unit_id: p.unit_id,
            cost_price: p.cost_price,
            sell_price: p.sell_price,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BarcodePayload {
    #[validate(length(min = 1, message = "barcode is required"))]
    #[schema(example = "8991234567890")]
    pub barcode: String,

    #[serde(default)]
    pub is_primary: bool,
}

impl From<&BarcodePayload> for NewBarcode {
    fn from(p: &BarcodePayload) -> Self {
        Self { barcode: p.barcode.clone(), is_primary: p.is_primary }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FullVariantPayload {
    #[serde(flatten)]
    #[validate(nested)]
    pub variant: VariantPayload,

    #[serde(default)]
    #[validate(nested)]
    pub barcodes: Vec<BarcodePayload>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductFullPayload {
    #[serde(flatten)]
    #[validate(nested)]
    pub product: CreateProductPayload,

    #[serde(default)]
    #[validate(nested)]
    pub variants: Vec<FullVariantPayload>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVariantPayload {
    pub product_id: Uuid,

    #[serde(flatten)]
    #[validate(nested)]
    pub variant: VariantPayload,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddBarcodePayload {
    pub variant_id: Uuid,

    #[serde(flatten)]
    #[validate(nested)]
    pub barcode: BarcodePayload,
}

// ---
// Handlers
// ---

#[utoipa::path(
    get,
    path = "/products",
    tag = "Products",
    responses((status = 200, description = "Products with variants and barcodes", body = Vec<ProductWithVariants>)),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    TenantContext(company_id): TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state
        .product_service
        .list_products(&app_state.db_pool, company_id)
        .await?;
    Ok(ApiResponse::ok(products))
}

#[utoipa::path(
    post,
    path = "/products",
    tag = "Products",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 404, description = "Category or brand not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    guard: RequireRole<OwnerOnly>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state
        .product_service
        .create_product(&app_state.db_pool, guard.user().company_id, &NewProduct::from(&payload))
        .await?;

    Ok(ApiResponse::created(product, "Product created"))
}

#[utoipa::path(
    post,
    path = "/products/full",
    tag = "Products",
    request_body = CreateProductFullPayload,
    responses(
        (status = 201, description = "Product created with variants and barcodes", body = ProductWithVariants),
        (status = 404, description = "Referenced category, brand or unit not found"),
        (status = 409, description = "Barcode already in use")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product_full(
    State(app_state): State<AppState>,
    guard: RequireRole<OwnerOnly>,
    Json(payload): Json<CreateProductFullPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let variants: Vec<NewVariantWithBarcodes> = payload
        .variants
        .iter()
        .map(|v| NewVariantWithBarcodes {
            variant: NewVariant::from(&v.variant),
            barcodes: v.barcodes.iter().map(NewBarcode::from).collect(),
        })
        .collect();

    let product = app_state
        .product_service
        .create_product_full(
            &app_state.db_pool,
            guard.user().company_id,
            &NewProduct::from(&payload.product),
            &variants,
        )
        .await?;

    Ok(ApiResponse::created(product, "Product created"))
}

#[utoipa::path(
    post,
    path = "/products/variants",
    tag = "Products",
    request_body = CreateVariantPayload,
    responses(
        (status = 201, description = "Variant created", body = ProductVariant),
        (status = 404, description = "Product not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_variant(
    State(app_state): State<AppState>,
    guard: RequireRole<OwnerOnly>,
    Json(payload): Json<CreateVariantPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let variant = app_state
        .product_service
        .create_variant(
            &app_state.db_pool,
            guard.user().company_id,
            payload.product_id,
            &NewVariant::from(&payload.variant),
        )
        .await?;

    Ok(ApiResponse::created(variant, "Variant created"))
}

#[utoipa::path(
    post,
    path = "/products/barcodes",
    tag = "Products",
    request_body = AddBarcodePayload,
    responses(
        (status = 201, description = "Barcode added", body = ProductBarcode),
        (status = 404, description = "Variant not found"),
        (status = 409, description = "Barcode already in use")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_barcode(
    State(app_state): State<AppState>,
    guard: RequireRole<OwnerOnly>,
    Json(payload): Json<AddBarcodePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let barcode = app_state
        .product_service
        .add_barcode(
            &app_state.db_pool,
            guard.user().company_id,
            payload.variant_id,
            &NewBarcode::from(&payload.barcode),
        )
        .await?;

    Ok(ApiResponse::created(barcode, "Barcode added"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_payload_reads_flat_fields_and_defaults_prices() {
        let payload: CreateProductFullPayload = serde_json::from_value(json!({
            "name": "Kopi",
            "variants": [
                { "name": "Large", "sellPrice": 18000, "barcodes": [{ "barcode": "111", "isPrimary": true }] },
                { "name": "Small" }
            ]
        }))
        .unwrap();

        assert_eq!(payload.product.name, "Kopi");
        assert!(!payload.product.is_service);
        assert_eq!(payload.variants[0].variant.sell_price, Decimal::from(18000));
        assert!(payload.variants[0].barcodes[0].is_primary);
        assert_eq!(payload.variants[1].variant.cost_price, Decimal::ZERO);
        assert!(payload.variants[1].barcodes.is_empty());
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn negative_price_in_a_nested_variant_is_rejected() {
        let payload: CreateProductFullPayload = serde_json::from_value(json!({
            "name": "Kopi",
            "variants": [{ "sellPrice": -1 }]
        }))
        .unwrap();

        let err = AppError::from(payload.validate().unwrap_err());
        assert_eq!(
            err.details().unwrap()["variants[0].variant.sell_price"][0],
            json!("must not be negative")
        );
    }
}
