// src/handlers/health.rs

use axum::{extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    #[schema(example = "OK")]
    pub status: &'static str,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service healthy", body = HealthStatus),
        (status = 500, description = "Database unreachable")
    )
)]
pub async fn health_check(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    sqlx::query("SELECT 1").execute(&app_state.db_pool).await?;
    Ok(ApiResponse::with_message(HealthStatus { status: "OK" }, "Service healthy"))
}
