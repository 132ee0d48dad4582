// src/models/catalog.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub short_name: Option<String>,
    pub code: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub company_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub code: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub code: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A payment method; `company_id = None` marks a method shared by all companies.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub name: String,
    pub code: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
