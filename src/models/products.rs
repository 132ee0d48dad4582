// src/models/products.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- 1. Product (catalog entry) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub company_id: Uuid,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub name: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub is_service: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// --- 2. Variant (the sellable unit, carries the prices) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: Option<String>,
    pub sku: Option<String>,
    pub unit_id: Option<Uuid>,
    #[schema(example = 12000.0)]
    pub cost_price: Decimal,
    #[schema(example = 15000.0)]
    pub sell_price: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// --- 3. Barcode ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductBarcode {
    pub id: Uuid,
    pub variant_id: Uuid,
    pub barcode: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariantWithBarcodes {
    #[serde(flatten)]
    pub variant: ProductVariant,
    pub barcodes: Vec<ProductBarcode>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithVariants {
    #[serde(flatten)]
    pub product: Product,
    pub variants: Vec<VariantWithBarcodes>,
}

/// One row of the product/variant/barcode join used by the product listing.
#[derive(Debug, Clone, FromRow)]
pub struct ProductListRow {
    pub product_id: Uuid,
    pub company_id: Uuid,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub product_name: String,
    pub product_code: Option<String>,
    pub description: Option<String>,
    pub is_service: bool,
    pub product_is_active: bool,
    pub product_created_at: DateTime<Utc>,
    pub variant_id: Option<Uuid>,
    pub variant_name: Option<String>,
    pub sku: Option<String>,
    pub unit_id: Option<Uuid>,
    pub cost_price: Option<Decimal>,
    pub sell_price: Option<Decimal>,
    pub variant_is_active: Option<bool>,
    pub variant_created_at: Option<DateTime<Utc>>,
    pub barcode_id: Option<Uuid>,
    pub barcode: Option<String>,
    pub is_primary: Option<bool>,
}

/// Authoritative prices of a variant, as read by the pricing resolver.
#[derive(Debug, Clone, Copy, PartialEq, FromRow)]
pub struct VariantPrice {
    pub id: Uuid,
    pub sell_price: Decimal,
    pub cost_price: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub name: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub is_service: bool,
}

#[derive(Debug, Clone)]
pub struct NewVariant {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub unit_id: Option<Uuid>,
    pub cost_price: Decimal,
    pub sell_price: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewBarcode {
    pub barcode: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone)]
pub struct NewVariantWithBarcodes {
    pub variant: NewVariant,
    pub barcodes: Vec<NewBarcode>,
}
