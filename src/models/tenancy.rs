// src/models/tenancy.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ---
// 1. Company (the tenant)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub code: Option<String>,
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 2. Outlet (a store belonging to a company)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Outlet {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    // Used as the invoice number prefix
    pub code: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 3. Warehouse (stock location owned by an outlet)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: Uuid,
    pub outlet_id: Uuid,
    pub name: String,
    pub code: Option<String>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCompany {
    pub name: String,
    pub code: Option<String>,
    pub tax_id: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewOutlet {
    pub name: String,
    pub code: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewWarehouse {
    pub outlet_id: Uuid,
    pub name: String,
    pub code: Option<String>,
    pub kind: Option<String>,
}
