// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Roles a user can hold inside a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Owner,
    Kasir,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Owner => "OWNER",
            Role::Kasir => "KASIR",
        }
    }
}

// Row of the `users` table
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub company_id: Uuid,
    pub full_name: String,
    pub username: String,
    pub email: Option<String>,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOwner {
    pub company_id: Uuid,
    pub full_name: String,
    pub username: String,
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub company_code: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
    pub company_id: Uuid,
    pub roles: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

/// JWT payload. The tenant (company) travels inside the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: Uuid,
    pub company_id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
    pub iat: usize,
    pub exp: usize,
}
