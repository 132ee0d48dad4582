// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{common::error::AppError, middleware::auth::AuthenticatedUser, models::auth::Role};

/// A set of roles, any of which grants access.
pub trait RoleRequirement: Send + Sync + 'static {
    fn allowed() -> &'static [Role];
}

/// Extractor guard: rejects with 403 unless the caller holds one of `R::allowed()`.
pub struct RequireRole<R>(pub AuthenticatedUser, PhantomData<R>);

impl<R> RequireRole<R> {
    pub fn user(&self) -> &AuthenticatedUser {
        &self.0
    }
}

impl<R, S> FromRequestParts<S> for RequireRole<R>
where
    R: RoleRequirement,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        if !user.has_any_role(R::allowed()) {
            tracing::warn!(user_id = %user.user_id, required = ?R::allowed(), "role check failed");
            return Err(AppError::Forbidden);
        }

        Ok(RequireRole(user, PhantomData))
    }
}

// ---
// Role sets
// ---

pub struct OwnerOnly;
impl RoleRequirement for OwnerOnly {
    fn allowed() -> &'static [Role] {
        &[Role::Owner]
    }
}

pub struct OwnerOrCashier;
impl RoleRequirement for OwnerOrCashier {
    fn allowed() -> &'static [Role] {
        &[Role::Owner, Role::Kasir]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use uuid::Uuid;

    fn parts_with(roles: &[&str]) -> Parts {
        let user = AuthenticatedUser {
            user_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            username: "someone".into(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        };
        Request::builder().extension(user).body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn owner_passes_both_guards() {
        let mut parts = parts_with(&["OWNER"]);
        assert!(RequireRole::<OwnerOnly>::from_request_parts(&mut parts, &()).await.is_ok());
        assert!(RequireRole::<OwnerOrCashier>::from_request_parts(&mut parts, &()).await.is_ok());
    }

    #[tokio::test]
    async fn cashier_is_forbidden_from_owner_routes() {
        let mut parts = parts_with(&["KASIR"]);

        let err = RequireRole::<OwnerOnly>::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.code(), "FORBIDDEN");

        let guard = RequireRole::<OwnerOrCashier>::from_request_parts(&mut parts, &())
            .await
            .ok()
            .unwrap();
        assert_eq!(guard.user().roles, vec!["KASIR".to_string()]);
    }

    #[tokio::test]
    async fn missing_identity_is_unauthorized() {
        let mut parts = Request::builder().body(()).unwrap().into_parts().0;

        let err = RequireRole::<OwnerOrCashier>::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.code(), "UNAUTHORIZED");
    }
}
