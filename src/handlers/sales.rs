// src/handlers/sales.rs

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use super::validators::{not_negative, positive, positive_qty};
use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::rbac::{OwnerOrCashier, RequireRole},
    models::sales::{
        NewSale, NewSaleItem, NewSalePayment, SaleCreated, SaleDetail, SaleListFilter, SaleListItem,
    },
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemPayload {
    pub variant_id: Uuid,

    #[validate(custom(function = "positive_qty"))]
    #[schema(example = 2.0)]
    pub qty: Decimal,

    // Falls back to the variant's sell price
    #[validate(custom(function = "not_negative"))]
    pub unit_price: Option<Decimal>,

    #[validate(custom(function = "not_negative"))]
    pub discount_amount: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalePaymentPayload {
    pub payment_method_id: Uuid,

    #[validate(custom(function = "positive"))]
    #[schema(example = 30000.0)]
    pub amount: Decimal,

    pub reference: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalePayload {
    pub outlet_id: Uuid,
    pub warehouse_id: Uuid,
    pub shift_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub note: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<SaleItemPayload>,

    #[serde(default)]
    #[validate(nested)]
    pub payments: Vec<SalePaymentPayload>,
}

impl From<CreateSalePayload> for NewSale {
    fn from(p: CreateSalePayload) -> Self {
        Self {
            outlet_id: p.outlet_id,
            warehouse_id: p.warehouse_id,
            shift_id: p.shift_id,
            customer_id: p.customer_id,
            note: p.note,
            items: p
                .items
                .into_iter()
                .map(|i| NewSaleItem {
                    variant_id: i.variant_id,
                    qty: i.qty,
                    unit_price: i.unit_price,
                    discount_amount: i.discount_amount,
                })
                .collect(),
            payments: p
                .payments
                .into_iter()
                .map(|pm| NewSalePayment {
                    payment_method_id: pm.payment_method_id,
                    amount: pm.amount,
                    reference: pm.reference,
                })
                .collect(),
        }
    }
}

/// Filters for the sales listing. Dates accept RFC 3339 or `YYYY-MM-DD`
/// (midnight UTC); `dateFrom` is inclusive, `dateTo` exclusive.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListSalesQuery {
    pub outlet_id: Option<Uuid>,
    #[param(example = "2025-02-01")]
    pub date_from: Option<String>,
    #[param(example = "2025-03-01T00:00:00Z")]
    pub date_to: Option<String>,
}

impl ListSalesQuery {
    fn into_filter(self) -> Result<SaleListFilter, AppError> {
        let mut errors = ValidationErrors::new();
        let date_from = parse_date_param(self.date_from.as_deref(), "dateFrom", &mut errors);
        let date_to = parse_date_param(self.date_to.as_deref(), "dateTo", &mut errors);

        if !errors.is_empty() {
            return Err(errors.into());
        }

        Ok(SaleListFilter { outlet_id: self.outlet_id, date_from, date_to })
    }
}

fn parse_date_param(
    raw: Option<&str>,
    field: &'static str,
    errors: &mut ValidationErrors,
) -> Option<DateTime<Utc>> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Some(dt.and_utc());
    }

    let mut err = ValidationError::new("date");
    err.message = Some("expected an RFC 3339 timestamp or YYYY-MM-DD".into());
    errors.add(field, err);
    None
}

// ---
// Handlers
// ---

#[utoipa::path(
    post,
    path = "/sales",
    tag = "Sales",
    request_body = CreateSalePayload,
    responses(
        (status = 201, description = "Sale created", body = SaleCreated),
        (status = 400, description = "Invalid items or payments"),
        (status = 404, description = "Outlet, warehouse, shift or customer not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_sale(
    State(app_state): State<AppState>,
    guard: RequireRole<OwnerOrCashier>,
    Json(payload): Json<CreateSalePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let created = app_state
        .sales_service
        .create_sale(&app_state.db_pool, guard.user().company_id, payload.into())
        .await?;

    Ok(ApiResponse::created(created, "Sale created"))
}

#[utoipa::path(
    get,
    path = "/sales",
    tag = "Sales",
    params(ListSalesQuery),
    responses(
        (status = 200, description = "Latest sales, newest first (max 200)", body = Vec<SaleListItem>),
        (status = 400, description = "Unparseable date filter")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_sales(
    State(app_state): State<AppState>,
    guard: RequireRole<OwnerOrCashier>,
    Query(query): Query<ListSalesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = query.into_filter()?;

    let sales = app_state
        .sales_service
        .list_sales(&app_state.db_pool, guard.user().company_id, &filter)
        .await?;

    Ok(ApiResponse::ok(sales))
}

#[utoipa::path(
    get,
    path = "/sales/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "Sale id")),
    responses(
        (status = 200, description = "Sale with lines and payments", body = SaleDetail),
        (status = 404, description = "Sale not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_sale(
    State(app_state): State<AppState>,
    guard: RequireRole<OwnerOrCashier>,
    Path(sale_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let sale = app_state
        .sales_service
        .get_sale_detail(&app_state.db_pool, guard.user().company_id, sale_id)
        .await?;

    Ok(ApiResponse::ok(sale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn date_filters_accept_both_formats() {
        let filter = ListSalesQuery {
            outlet_id: None,
            date_from: Some("2025-02-01".into()),
            date_to: Some("2025-02-02T07:00:00+07:00".into()),
        }
        .into_filter()
        .unwrap();

        assert_eq!(filter.date_from, Some(Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap()));
        assert_eq!(filter.date_to, Some(Utc.with_ymd_and_hms(2025, 2, 2, 0, 0, 0).unwrap()));
    }

    #[test]
    fn bad_date_is_a_validation_error() {
        let err = ListSalesQuery { date_to: Some("yesterday".into()), ..Default::default() }
            .into_filter()
            .unwrap_err();

        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(err.details().unwrap().get("dateTo").is_some());
    }

    #[test]
    fn blank_dates_are_ignored() {
        let filter = ListSalesQuery { date_from: Some("  ".into()), ..Default::default() }
            .into_filter()
            .unwrap();
        assert!(filter.date_from.is_none());
    }

    #[test]
    fn item_and_payment_rules_are_checked_per_index() {
        let payload: CreateSalePayload = serde_json::from_value(json!({
            "outletId": Uuid::new_v4(),
            "warehouseId": Uuid::new_v4(),
            "items": [{ "variantId": Uuid::new_v4(), "qty": 0 }],
            "payments": [{ "paymentMethodId": Uuid::new_v4(), "amount": -5 }]
        }))
        .unwrap();

        let err = AppError::from(payload.validate().unwrap_err());
        let details = err.details().unwrap();
        assert!(details.get("items[0].qty").is_some());
        assert!(details.get("payments[0].amount").is_some());
    }

    #[test]
    fn amounts_wider_than_their_columns_are_rejected() {
        let payload: CreateSalePayload = serde_json::from_value(json!({
            "outletId": Uuid::new_v4(),
            "warehouseId": Uuid::new_v4(),
            "items": [{
                "variantId": Uuid::new_v4(),
                "qty": 1e20,
                "unitPrice": 1e20
            }],
            "payments": [{ "paymentMethodId": Uuid::new_v4(), "amount": 5e28 }]
        }))
        .unwrap();

        let err = AppError::from(payload.validate().unwrap_err());
        let details = err.details().unwrap();
        assert!(details.get("items[0].qty").is_some());
        assert!(details.get("items[0].unit_price").is_some());
        assert!(details.get("payments[0].amount").is_some());
    }

    #[test]
    fn missing_lists_deserialize_as_empty() {
        let payload: CreateSalePayload = serde_json::from_value(json!({
            "outletId": Uuid::new_v4(),
            "warehouseId": Uuid::new_v4()
        }))
        .unwrap();

        assert!(payload.validate().is_ok());
        let sale = NewSale::from(payload);
        assert!(sale.items.is_empty() && sale.payments.is_empty());
    }
}
