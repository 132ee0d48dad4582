// src/middleware/tenancy.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::{common::error::AppError, middleware::auth::AuthenticatedUser};

// The caller's company. It always comes from the verified token, never from
// the request body or a header.
#[derive(Debug, Clone, Copy)]
pub struct TenantContext(pub Uuid);

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .map(|user| TenantContext(user.company_id))
            .ok_or_else(AppError::unauthorized)
    }
}
