// src/handlers/inventory.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::validators::{non_zero, not_negative};
use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::{
        rbac::{OwnerOnly, RequireRole},
        tenancy::TenantContext,
    },
    models::inventory::{BalanceDrift, InventoryRow, StockAdjustLine, StockAdjusted, StockAdjustment},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustLinePayload {
    pub variant_id: Uuid,

    // Signed: positive adds stock, negative removes it
    #[validate(custom(function = "non_zero"))]
    #[schema(example = -2.0)]
    pub qty_diff: Decimal,

    #[validate(custom(function = "not_negative"))]
    pub unit_cost: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockPayload {
    pub warehouse_id: Uuid,
    pub note: Option<String>,

    #[validate(nested)]
    pub lines: Vec<AdjustLinePayload>,
}

impl From<AdjustStockPayload> for StockAdjustment {
    fn from(p: AdjustStockPayload) -> Self {
        Self {
            warehouse_id: p.warehouse_id,
            note: p.note,
            lines: p
                .lines
                .into_iter()
                .map(|l| StockAdjustLine {
                    variant_id: l.variant_id,
                    qty_diff: l.qty_diff,
                    unit_cost: l.unit_cost,
                })
                .collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/inventory/warehouse/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "Warehouse id")),
    responses(
        (status = 200, description = "Balances of the warehouse", body = Vec<InventoryRow>),
        (status = 404, description = "Warehouse not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_inventory_by_warehouse(
    State(app_state): State<AppState>,
    TenantContext(company_id): TenantContext,
    Path(warehouse_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state
        .inventory_service
        .get_inventory_by_warehouse(&app_state.db_pool, company_id, warehouse_id)
        .await?;
    Ok(ApiResponse::ok(rows))
}

#[utoipa::path(
    get,
    path = "/inventory/warehouse/{id}/reconcile",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "Warehouse id")),
    responses(
        (status = 200, description = "Balances that disagree with the ledger (empty when consistent)", body = Vec<BalanceDrift>),
        (status = 404, description = "Warehouse not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn reconcile_warehouse(
    State(app_state): State<AppState>,
    guard: RequireRole<OwnerOnly>,
    Path(warehouse_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let drift = app_state
        .inventory_service
        .reconcile_warehouse(&app_state.db_pool, guard.user().company_id, warehouse_id)
        .await?;
    Ok(ApiResponse::ok(drift))
}

#[utoipa::path(
    post,
    path = "/inventory/adjust",
    tag = "Inventory",
    request_body = AdjustStockPayload,
    responses(
        (status = 201, description = "Stock adjusted", body = StockAdjusted),
        (status = 400, description = "Empty lines or unknown variant"),
        (status = 404, description = "Warehouse not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn adjust_stock(
    State(app_state): State<AppState>,
    guard: RequireRole<OwnerOnly>,
    Json(payload): Json<AdjustStockPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let adjusted = app_state
        .inventory_service
        .adjust_stock(&app_state.db_pool, guard.user().company_id, payload.into())
        .await?;

    Ok(ApiResponse::created(adjusted, "Stock adjusted"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn zero_qty_diff_is_a_field_error() {
        let payload: AdjustStockPayload = serde_json::from_value(json!({
            "warehouseId": Uuid::new_v4(),
            "lines": [
                { "variantId": Uuid::new_v4(), "qtyDiff": 5 },
                { "variantId": Uuid::new_v4(), "qtyDiff": 0, "unitCost": -1 }
            ]
        }))
        .unwrap();

        let err = AppError::from(payload.validate().unwrap_err());
        let details = err.details().unwrap();
        assert!(details.get("lines[1].qty_diff").is_some());
        assert!(details.get("lines[1].unit_cost").is_some());
        assert!(details.get("lines[0].qty_diff").is_none());
    }
}
