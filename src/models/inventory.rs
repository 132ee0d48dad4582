// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// What originated a stock movement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "stock_ref_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockRefType {
    Adjustment,
    Sale,
}

// --- Ledger input ---

/// Header of a movement about to be recorded.
#[derive(Debug, Clone)]
pub struct MovementHeader {
    pub company_id: Uuid,
    pub source_warehouse_id: Uuid,
    // Only set for transfers
    pub target_warehouse_id: Option<Uuid>,
    pub ref_type: StockRefType,
    pub ref_id: Option<Uuid>,
    pub note: Option<String>,
}

/// One signed quantity change for a variant in the header's source warehouse.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementLine {
    pub variant_id: Uuid,
    pub qty_delta: Decimal,
    pub unit_cost: Option<Decimal>,
}

// --- Persisted rows ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryBalance {
    pub id: Uuid,
    pub warehouse_id: Uuid,
    pub variant_id: Uuid,
    pub qty: Decimal,
    pub min_qty: Decimal,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    pub company_id: Uuid,
    pub source_warehouse_id: Uuid,
    pub target_warehouse_id: Option<Uuid>,
    pub ref_type: StockRefType,
    pub ref_id: Option<Uuid>,
    pub movement_date: DateTime<Utc>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovementLine {
    pub id: Uuid,
    pub stock_movement_id: Uuid,
    pub variant_id: Uuid,
    pub qty: Decimal,
    pub unit_cost: Option<Decimal>,
}

/// Balance joined with variant/product metadata for display.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRow {
    pub id: Uuid,
    pub warehouse_id: Uuid,
    pub variant_id: Uuid,
    #[schema(example = 120.0)]
    pub qty: Decimal,
    pub min_qty: Decimal,
    pub variant_name: Option<String>,
    pub sku: Option<String>,
    pub product_name: String,
    pub product_code: Option<String>,
    pub unit_name: Option<String>,
}

/// A (warehouse, variant) balance that disagrees with the sum of its ledger lines.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDrift {
    pub variant_id: Uuid,
    pub balance_qty: Decimal,
    pub ledger_qty: Decimal,
}

// --- Stock adjustment ---

#[derive(Debug, Clone)]
pub struct StockAdjustLine {
    pub variant_id: Uuid,
    pub qty_diff: Decimal,
    pub unit_cost: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct StockAdjustment {
    pub warehouse_id: Uuid,
    pub note: Option<String>,
    pub lines: Vec<StockAdjustLine>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjusted {
    pub stock_movement_id: Uuid,
}
