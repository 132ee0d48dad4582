// src/handlers/tenancy.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::{
        rbac::{OwnerOnly, RequireRole},
        tenancy::TenantContext,
    },
    models::tenancy::{Company, NewCompany, NewOutlet, NewWarehouse, Outlet, Warehouse},
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyPayload {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "code cannot be empty"))]
    #[schema(example = "CUAN")]
    pub code: Option<String>,

    pub tax_id: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOutletPayload {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub code: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWarehousePayload {
    pub outlet_id: Uuid,

    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,

    pub code: Option<String>,

    #[serde(rename = "type")]
    #[schema(example = "WAREHOUSE")]
    pub kind: Option<String>,
}

// ---
// Companies
// ---

#[utoipa::path(
    post,
    path = "/companies",
    tag = "Companies",
    request_body = CreateCompanyPayload,
    responses(
        (status = 201, description = "Company created", body = Company),
        (status = 409, description = "Company code already exists")
    )
)]
pub async fn create_company(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateCompanyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let company = app_state
        .tenancy_service
        .create_company(
            &app_state.db_pool,
            &NewCompany {
                name: payload.name,
                code: payload.code,
                tax_id: payload.tax_id,
                address: payload.address,
            },
        )
        .await?;

    Ok(ApiResponse::created(company, "Company created"))
}

#[utoipa::path(
    get,
    path = "/companies",
    tag = "Companies",
    responses(
        (status = 200, description = "The caller's company", body = Vec<Company>),
        (status = 403, description = "OWNER role required")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_companies(
    State(app_state): State<AppState>,
    guard: RequireRole<OwnerOnly>,
) -> Result<impl IntoResponse, AppError> {
    let companies = app_state
        .tenancy_service
        .list_companies(&app_state.db_pool, guard.user().company_id)
        .await?;

    Ok(ApiResponse::ok(companies))
}

#[utoipa::path(
    get,
    path = "/companies/{id}",
    tag = "Companies",
    params(("id" = Uuid, Path, description = "Company id")),
    responses(
        (status = 200, description = "Company", body = Company),
        (status = 404, description = "Company not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_company(
    State(app_state): State<AppState>,
    guard: RequireRole<OwnerOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state
        .tenancy_service
        .get_company(&app_state.db_pool, guard.user().company_id, id)
        .await?;

    Ok(ApiResponse::ok(company))
}

// ---
// Outlets
// ---

#[utoipa::path(
    post,
    path = "/outlets",
    tag = "Outlets",
    request_body = CreateOutletPayload,
    responses(
        (status = 201, description = "Outlet created", body = Outlet),
        (status = 403, description = "OWNER role required")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_outlet(
    State(app_state): State<AppState>,
    guard: RequireRole<OwnerOnly>,
    Json(payload): Json<CreateOutletPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let outlet = app_state
        .tenancy_service
        .create_outlet(
            &app_state.db_pool,
            guard.user().company_id,
            &NewOutlet {
                name: payload.name,
                code: payload.code,
                address: payload.address,
                phone: payload.phone,
            },
        )
        .await?;

    Ok(ApiResponse::created(outlet, "Outlet created"))
}

#[utoipa::path(
    get,
    path = "/outlets",
    tag = "Outlets",
    responses((status = 200, description = "Outlets of the company", body = Vec<Outlet>)),
    security(("api_jwt" = []))
)]
pub async fn list_outlets(
    State(app_state): State<AppState>,
    TenantContext(company_id): TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let outlets = app_state
        .tenancy_service
        .list_outlets(&app_state.db_pool, company_id)
        .await?;

    Ok(ApiResponse::ok(outlets))
}

#[utoipa::path(
    get,
    path = "/outlets/{id}",
    tag = "Outlets",
    params(("id" = Uuid, Path, description = "Outlet id")),
    responses(
        (status = 200, description = "Outlet", body = Outlet),
        (status = 404, description = "Outlet not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_outlet(
    State(app_state): State<AppState>,
    TenantContext(company_id): TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let outlet = app_state
        .tenancy_service
        .get_outlet(&app_state.db_pool, company_id, id)
        .await?;

    Ok(ApiResponse::ok(outlet))
}

// ---
// Warehouses
// ---

#[utoipa::path(
    post,
    path = "/warehouses",
    tag = "Warehouses",
    request_body = CreateWarehousePayload,
    responses(
        (status = 201, description = "Warehouse created", body = Warehouse),
        (status = 404, description = "OUTLET_NOT_FOUND")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_warehouse(
    State(app_state): State<AppState>,
    guard: RequireRole<OwnerOnly>,
    Json(payload): Json<CreateWarehousePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let warehouse = app_state
        .tenancy_service
        .create_warehouse(
            &app_state.db_pool,
            guard.user().company_id,
            &NewWarehouse {
                outlet_id: payload.outlet_id,
                name: payload.name,
                code: payload.code,
                kind: payload.kind,
            },
        )
        .await?;

    Ok(ApiResponse::created(warehouse, "Warehouse created"))
}

#[utoipa::path(
    get,
    path = "/warehouses",
    tag = "Warehouses",
    responses((status = 200, description = "Warehouses of the company", body = Vec<Warehouse>)),
    security(("api_jwt" = []))
)]
pub async fn list_warehouses(
    State(app_state): State<AppState>,
    TenantContext(company_id): TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let warehouses = app_state
        .tenancy_service
        .list_warehouses(&app_state.db_pool, company_id)
        .await?;

    Ok(ApiResponse::ok(warehouses))
}

#[utoipa::path(
    get,
    path = "/warehouses/{id}",
    tag = "Warehouses",
    params(("id" = Uuid, Path, description = "Warehouse id")),
    responses(
        (status = 200, description = "Warehouse", body = Warehouse),
        (status = 404, description = "Warehouse not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_warehouse(
    State(app_state): State<AppState>,
    TenantContext(company_id): TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let warehouse = app_state
        .tenancy_service
        .get_warehouse(&app_state.db_pool, company_id, id)
        .await?;

    Ok(ApiResponse::ok(warehouse))
}
