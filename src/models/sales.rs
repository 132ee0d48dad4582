// src/models/sales.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sale_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    Completed,
    Cancelled,
}

// --- Validated input ---

#[derive(Debug, Clone)]
pub struct NewSaleItem {
    pub variant_id: Uuid,
    pub qty: Decimal,
    // Overrides the variant's sell price when present
    pub unit_price: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct NewSalePayment {
    pub payment_method_id: Uuid,
    pub amount: Decimal,
    pub reference: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSale {
    pub outlet_id: Uuid,
    pub warehouse_id: Uuid,
    pub shift_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub note: Option<String>,
    pub items: Vec<NewSaleItem>,
    pub payments: Vec<NewSalePayment>,
}

// --- Derived values ---

/// A sale line after price resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub variant_id: Uuid,
    pub qty: Decimal,
    pub unit_price: Decimal,
    pub discount_amount: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedSale {
    pub lines: Vec<PricedLine>,
    pub subtotal: Decimal,
    pub discount_total: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
}

/// Header values written to `sales`.
#[derive(Debug, Clone)]
pub struct SaleRecord<'a> {
    pub company_id: Uuid,
    pub outlet_id: Uuid,
    pub shift_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub invoice_number: &'a str,
    pub status: SaleStatus,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub note: Option<&'a str>,
}

// --- Output ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleCreated {
    pub sale_id: Uuid,
    #[schema(example = "OUT/20250201/1234")]
    pub invoice_number: String,
    pub total_amount: Decimal,
    pub stock_movement_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct SaleListFilter {
    pub outlet_id: Option<Uuid>,
    // Inclusive
    pub date_from: Option<DateTime<Utc>>,
    // Exclusive
    pub date_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleListItem {
    pub id: Uuid,
    pub invoice_number: String,
    #[sqlx(rename = "sale_datetime")]
    #[serde(rename = "saleDateTime")]
    pub sale_date_time: DateTime<Utc>,
    pub outlet_name: String,
    pub customer_name: Option<String>,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleHeader {
    pub id: Uuid,
    pub invoice_number: String,
    #[sqlx(rename = "sale_datetime")]
    #[serde(rename = "saleDateTime")]
    pub sale_date_time: DateTime<Utc>,
    pub status: SaleStatus,
    pub outlet_id: Uuid,
    pub outlet_name: String,
    pub customer_id: Option<Uuid>,
    pub customer_name: Option<String>,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetailLine {
    pub id: Uuid,
    pub variant_id: Uuid,
    pub qty: Decimal,
    pub unit_price: Decimal,
    pub discount_amount: Decimal,
    pub line_total: Decimal,
    pub product_name: String,
    pub product_code: Option<String>,
    pub variant_name: Option<String>,
    pub sku: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetailPayment {
    pub id: Uuid,
    pub payment_method_id: Uuid,
    pub amount: Decimal,
    pub reference: Option<String>,
    pub payment_method_name: String,
    pub payment_method_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetail {
    #[serde(flatten)]
    pub header: SaleHeader,
    pub lines: Vec<SaleDetailLine>,
    pub payments: Vec<SaleDetailPayment>,
}
