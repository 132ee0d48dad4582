// src/handlers/auth.rs

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    models::auth::{Credentials, LoginResponse, NewOwner, User},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterOwnerPayload {
    pub company_id: Uuid,

    #[validate(length(min = 1, message = "fullName is required"))]
    pub full_name: String,

    #[validate(length(min = 3, message = "username must have at least 3 characters"))]
    pub username: String,

    #[validate(email(message = "invalid email"))]
    pub email: Option<String>,

    #[validate(length(min = 6, message = "password must have at least 6 characters"))]
    #[schema(example = "s3cret!")]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "companyCode is required"))]
    pub company_code: String,

    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/auth/register-owner",
    tag = "Auth",
    request_body = RegisterOwnerPayload,
    responses(
        (status = 201, description = "Owner registered", body = User),
        (status = 400, description = "Validation error or OWNER_EXISTS"),
        (status = 404, description = "Company not found")
    )
)]
pub async fn register_owner(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterOwnerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = app_state
        .auth_service
        .register_owner(
            &app_state.db_pool,
            NewOwner {
                company_id: payload.company_id,
                full_name: payload.full_name,
                username: payload.username,
                email: payload.email,
                password: payload.password,
            },
        )
        .await?;

    Ok(ApiResponse::created(user, "Owner registered"))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "INVALID_COMPANY"),
        (status = 401, description = "INVALID_LOGIN")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let response = app_state
        .auth_service
        .login(
            &app_state.db_pool,
            Credentials {
                company_code: payload.company_code,
                username: payload.username,
                password: payload.password,
            },
        )
        .await?;

    Ok(ApiResponse::with_message(response, "Login success"))
}
