// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{Claims, Role},
};

/// Identity carried by a valid bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.iter().any(|r| r == role.as_str())
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.has_role(*role))
    }
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            company_id: claims.company_id,
            username: claims.username,
            roles: claims.roles,
        }
    }
}

// Validates `Authorization: Bearer <jwt>` and stores the identity in the request extensions
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(AppError::unauthorized)?;

    let claims = app_state.auth_service.validate_token(bearer.token())?;

    request.extensions_mut().insert(AuthenticatedUser::from(claims));
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(AppError::unauthorized)
    }
}
