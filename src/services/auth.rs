// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::{Acquire, Executor, Postgres};

use crate::{
    common::error::AppError,
    db::{TenancyRepository, UserRepository},
    models::auth::{Claims, Credentials, LoginResponse, LoginUser, NewOwner, Role, User},
};

pub const BCRYPT_COST: u32 = 10;

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    tenancy_repo: TenancyRepository,
    jwt_secret: String,
    jwt_ttl: chrono::Duration,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        tenancy_repo: TenancyRepository,
        jwt_secret: String,
        jwt_ttl: chrono::Duration,
    ) -> Self {
        Self { user_repo, tenancy_repo, jwt_secret, jwt_ttl }
    }

    /// Creates the first company-wide OWNER of a company.
    pub async fn register_owner<'e, E>(&self, executor: E, input: NewOwner) -> Result<User, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        // 1. Hashing runs off the async runtime and outside the transaction
        let password = input.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash(&password, BCRYPT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("password hashing task failed: {e}"))??;

        let mut tx = executor.begin().await?;

        if self.tenancy_repo.find_company(&mut *tx, input.company_id).await?.is_none() {
            return Err(AppError::not_found("COMPANY_NOT_FOUND", "Company not found"));
        }

        // 2. Only one owner per company through this endpoint
        if self.user_repo.company_has_owner(&mut *tx, input.company_id).await? {
            return Err(AppError::business("OWNER_EXISTS", "Owner already exists for this company"));
        }

        // 3. User + role in the same transaction
        let user = self
            .user_repo
            .create_user(
                &mut *tx,
                input.company_id,
                &input.full_name,
                &input.username,
                input.email.as_deref(),
                &password_hash,
            )
            .await?;

        self.user_repo.assign_role(&mut *tx, user.id, Role::Owner, None).await?;

        tx.commit().await?;

        tracing::info!(user_id = %user.id, company_id = %user.company_id, "owner registered");
        Ok(user)
    }

    pub async fn login<'e, E>(&self, executor: E, credentials: Credentials) -> Result<LoginResponse, AppError>
    where
        E: Executor<'e, Database = Postgres> + Copy,
    {
        let company = self
            .tenancy_repo
            .find_company_by_code(executor, &credentials.company_code)
            .await?
            .ok_or_else(|| AppError::business("INVALID_COMPANY", "Invalid company"))?;

        let user = self
            .user_repo
            .find_by_username(executor, company.id, &credentials.username)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(invalid_login)?;

        let password = credentials.password;
        let password_hash = user.password_hash.clone();
        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("password verification task failed: {e}"))??;

        if !is_password_valid {
            return Err(invalid_login());
        }

        let roles = self.user_repo.list_role_names(executor, user.id).await?;
        let token = self.create_token(&user, roles.clone())?;

        Ok(LoginResponse {
            token,
            user: LoginUser {
                id: user.id,
                full_name: user.full_name,
                username: user.username,
                company_id: user.company_id,
                roles,
            },
        })
    }

    /// Decodes and checks a bearer token (signature + expiry).
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::invalid_token())
    }

    pub fn create_token(&self, user: &User, roles: Vec<String>) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.jwt_ttl;

        let claims = Claims {
            sub: user.id,
            company_id: user.company_id,
            username: user.username.clone(),
            roles,
            iat: now.timestamp() as usize,
            exp: expires_at.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

fn invalid_login() -> AppError {
    AppError::Unauthorized { code: "INVALID_LOGIN", message: "Invalid credentials".into() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn service(ttl: chrono::Duration) -> AuthService {
        AuthService::new(
            UserRepository::new(),
            TenancyRepository::new(),
            "test-secret".into(),
            ttl,
        )
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            full_name: "Ana Owner".into(),
            username: "ana".into(),
            email: None,
            password_hash: String::new(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_round_trips_claims() {
        let auth = service(chrono::Duration::hours(12));
        let user = user();

        let token = auth.create_token(&user, vec!["OWNER".into()]).unwrap();
        let claims = auth.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.company_id, user.company_id);
        assert_eq!(claims.username, "ana");
        assert_eq!(claims.roles, vec!["OWNER".to_string()]);
        assert_eq!(claims.exp - claims.iat, 12 * 3600);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = service(chrono::Duration::hours(1))
            .create_token(&user(), vec![])
            .unwrap();
        let other = AuthService::new(
            UserRepository::new(),
            TenancyRepository::new(),
            "another-secret".into(),
            chrono::Duration::hours(1),
        );

        let err = other.validate_token(&token).unwrap_err();
        assert_eq!(err.code(), "UNAUTHORIZED");
    }

    #[test]
    fn expired_token_is_rejected() {
        // Past the default 60s leeway
        let token = service(chrono::Duration::seconds(-120))
            .create_token(&user(), vec![])
            .unwrap();

        assert!(service(chrono::Duration::hours(1)).validate_token(&token).is_err());
    }

    #[test]
    fn invalid_login_is_unauthorized() {
        let err = invalid_login();
        assert_eq!(err.code(), "INVALID_LOGIN");
        assert_eq!(err.kind().status(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
