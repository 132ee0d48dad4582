// src/handlers/catalog.rs

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
    models::catalog::{Brand, Category, PaymentMethod, Unit},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUnitPayload {
    #[validate(length(min = 1, message = "name is required"))]
    #[schema(example = "Piece")]
    pub name: String,
    #[schema(example = "pcs")]
    pub short_name: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryPayload {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub code: Option<String>,
    pub parent_id: Option<Uuid>,
}

/// Shared by brands and payment methods.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNamedPayload {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub code: Option<String>,
}

// --- Units ---

#[utoipa::path(
    post,
    path = "/units",
    tag = "Catalog",
    request_body = CreateUnitPayload,
    responses((status = 201, description = "Unit created", body = Unit)),
    security(("api_jwt" = []))
)]
pub async fn create_unit(
    State(app_state): State<AppState>,
    guard: RequireRole<OwnerOnly>,
    Json(payload): Json<CreateUnitPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let unit = app_state
        .catalog_service
        .create_unit(
            &app_state.db_pool,
            guard.user().company_id,
            &payload.name,
            payload.short_name.as_deref(),
            payload.code.as_deref(),
        )
        .await?;

    Ok(ApiResponse::created(unit, "Unit created"))
}

#[utoipa::path(
    get,
    path = "/units",
    tag = "Catalog",
    responses((status = 200, description = "Units", body = Vec<Unit>)),
    security(("api_jwt" = []))
)]
pub async fn list_units(
    State(app_state): State<AppState>,
    TenantContext(company_id): TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let units = app_state.catalog_service.list_units(&app_state.db_pool, company_id).await?;
    Ok(ApiResponse::ok(units))
}

#[utoipa::path(
    get,
    path = "/units/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "Unit id")),
    responses(
        (status = 200, description = "Unit", body = Unit),
        (status = 404, description = "Unit not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_unit(
    State(app_state): State<AppState>,
    TenantContext(company_id): TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let unit = app_state.catalog_service.get_unit(&app_state.db_pool, company_id, id).await?;
    Ok(ApiResponse::ok(unit))
}

// --- Categories ---

#[utoipa::path(
    post,
    path = "/categories",
    tag = "Catalog",
    request_body = CreateCategoryPayload,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 404, description = "Parent category not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    guard: RequireRole<OwnerOnly>,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let category = app_state
        .catalog_service
        .create_category(
            &app_state.db_pool,
            guard.user().company_id,
            payload.parent_id,
            &payload.name,
            payload.code.as_deref(),
        )
        .await?;

    Ok(ApiResponse::created(category, "Category created"))
}

#[utoipa::path(
    get,
    path = "/categories",
    tag = "Catalog",
    responses((status = 200, description = "Categories", body = Vec<Category>)),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    TenantContext(company_id): TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let categories = app_state
        .catalog_service
        .list_categories(&app_state.db_pool, company_id)
        .await?;
    Ok(ApiResponse::ok(categories))
}

#[utoipa::path(
    get,
    path = "/categories/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = Category),
        (status = 404, description = "Category not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_category(
    State(app_state): State<AppState>,
    TenantContext(company_id): TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let category = app_state
        .catalog_service
        .get_category(&app_state.db_pool, company_id, id)
        .await?;
    Ok(ApiResponse::ok(category))
}

// --- Brands ---

#[utoipa::path(
    post,
    path = "/brands",
    tag = "Catalog",
    request_body = CreateNamedPayload,
    responses((status = 201, description = "Brand created", body = Brand)),
    security(("api_jwt" = []))
)]
pub async fn create_brand(
    State(app_state): State<AppState>,
    guard: RequireRole<OwnerOnly>,
    Json(payload): Json<CreateNamedPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let brand = app_state
        .catalog_service
        .create_brand(
            &app_state.db_pool,
            guard.user().company_id,
            &payload.name,
            payload.code.as_deref(),
        )
        .await?;

    Ok(ApiResponse::created(brand, "Brand created"))
}

#[utoipa::path(
    get,
    path = "/brands",
    tag = "Catalog",
    responses((status = 200, description = "Brands", body = Vec<Brand>)),
    security(("api_jwt" = []))
)]
pub async fn list_brands(
    State(app_state): State<AppState>,
    TenantContext(company_id): TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let brands = app_state.catalog_service.list_brands(&app_state.db_pool, company_id).await?;
    Ok(ApiResponse::ok(brands))
}

#[utoipa::path(
    get,
    path = "/brands/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "Brand id")),
    responses(
        (status = 200, description = "Brand", body = Brand),
        (status = 404, description = "Brand not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_brand(
    State(app_state): State<AppState>,
    TenantContext(company_id): TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let brand = app_state.catalog_service.get_brand(&app_state.db_pool, company_id, id).await?;
    Ok(ApiResponse::ok(brand))
}

// --- Payment methods ---

#[utoipa::path(
    post,
    path = "/payment-methods",
    tag = "Catalog",
    request_body = CreateNamedPayload,
    responses((status = 201, description = "Payment method created", body = PaymentMethod)),
    security(("api_jwt" = []))
)]
pub async fn create_payment_method(
    State(app_state): State<AppState>,
    guard: RequireRole<OwnerOnly>,
    Json(payload): Json<CreateNamedPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let method = app_state
        .catalog_service
        .create_payment_method(
            &app_state.db_pool,
            guard.user().company_id,
            &payload.name,
            payload.code.as_deref(),
        )
        .await?;

    Ok(ApiResponse::created(method, "Payment method created"))
}

#[utoipa::path(
    get,
    path = "/payment-methods",
    tag = "Catalog",
    responses((status = 200, description = "Company and global payment methods", body = Vec<PaymentMethod>)),
    security(("api_jwt" = []))
)]
pub async fn list_payment_methods(
    State(app_state): State<AppState>,
    TenantContext(company_id): TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let methods = app_state
        .catalog_service
        .list_payment_methods(&app_state.db_pool, company_id)
        .await?;
    Ok(ApiResponse::ok(methods))
}
