// src/db/tenancy_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::conflict_on_unique, error::AppError},
    models::tenancy::{Company, NewCompany, NewOutlet, NewWarehouse, Outlet, Warehouse},
};

const COMPANY_COLUMNS: &str = "id, name, code, tax_id, address, is_active, created_at, updated_at";
const OUTLET_COLUMNS: &str =
    "id, company_id, name, code, address, phone, is_active, created_at, updated_at";
const WAREHOUSE_COLUMNS: &str =
    "w.id, w.outlet_id, w.name, w.code, w.type, w.is_active, w.created_at, w.updated_at";

// Company -> Outlet -> Warehouse. Every read filters soft-deleted rows.
#[derive(Clone, Default)]
pub struct TenancyRepository;

impl TenancyRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  COMPANIES
    // =========================================================================

    pub async fn create_company<'e, E>(
        &self,
        executor: E,
        input: &NewCompany,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Company>(&format!(
            "INSERT INTO companies (name, code, tax_id, address)
             VALUES ($1, $2, $3, $4)
             RETURNING {COMPANY_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.tax_id)
        .bind(&input.address)
        .fetch_one(executor)
        .await
        .map_err(conflict_on_unique("COMPANY_CODE_TAKEN", "Company code already exists"))
    }

    pub async fn list_companies<'e, E>(&self, executor: E) -> Result<Vec<Company>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let companies = sqlx::query_as::<_, Company>(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE deleted_at IS NULL ORDER BY name"
        ))
        .fetch_all(executor)
        .await?;
        Ok(companies)
    }

    pub async fn find_company<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
    ) -> Result<Option<Company>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, Company>(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(company_id)
        .fetch_optional(executor)
        .await?;
        Ok(company)
    }

    pub async fn find_company_by_code<'e, E>(
        &self,
        executor: E,
        code: &str,
    ) -> Result<Option<Company>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, Company>(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE code = $1 AND deleted_at IS NULL"
        ))
        .bind(code)
        .fetch_optional(executor)
        .await?;
        Ok(company)
    }

    // =========================================================================
    //  OUTLETS
    // =========================================================================

    pub async fn create_outlet<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        input: &NewOutlet,
    ) -> Result<Outlet, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let outlet = sqlx::query_as::<_, Outlet>(&format!(
            "INSERT INTO outlets (company_id, name, code, address, phone)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {OUTLET_COLUMNS}"
        ))
        .bind(company_id)
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.address)
        .bind(&input.phone)
        .fetch_one(executor)
        .await?;
        Ok(outlet)
    }

    pub async fn list_outlets<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
    ) -> Result<Vec<Outlet>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let outlets = sqlx::query_as::<_, Outlet>(&format!(
            "SELECT {OUTLET_COLUMNS} FROM outlets
              WHERE company_id = $1 AND deleted_at IS NULL
              ORDER BY name"
        ))
        .bind(company_id)
        .fetch_all(executor)
        .await?;
        Ok(outlets)
    }

    /// Outlet by id, only if it belongs to `company_id` and is not soft-deleted.
    pub async fn find_outlet<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        outlet_id: Uuid,
    ) -> Result<Option<Outlet>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let outlet = sqlx::query_as::<_, Outlet>(&format!(
            "SELECT {OUTLET_COLUMNS} FROM outlets
              WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL"
        ))
        .bind(outlet_id)
        .bind(company_id)
        .fetch_optional(executor)
        .await?;
        Ok(outlet)
    }

    // =========================================================================
    //  WAREHOUSES
    // =========================================================================

    pub async fn create_warehouse<'e, E>(
        &self,
        executor: E,
        input: &NewWarehouse,
    ) -> Result<Warehouse, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let warehouse = sqlx::query_as::<_, Warehouse>(
            r#"
            INSERT INTO warehouses (outlet_id, name, code, type)
            VALUES ($1, $2, $3, $4)
            RETURNING id, outlet_id, name, code, type, is_active, created_at, updated_at
            "#,
        )
        .bind(input.outlet_id)
        .bind(&input.name)
        .bind(&input.code)
        .bind(input.kind.as_deref().unwrap_or("WAREHOUSE"))
        .fetch_one(executor)
        .await?;
        Ok(warehouse)
    }

    pub async fn list_warehouses<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
    ) -> Result<Vec<Warehouse>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let warehouses = sqlx::query_as::<_, Warehouse>(&format!(
            "SELECT {WAREHOUSE_COLUMNS}
               FROM warehouses w
               JOIN outlets o ON o.id = w.outlet_id
              WHERE o.company_id = $1
                AND w.deleted_at IS NULL
                AND o.deleted_at IS NULL
              ORDER BY o.name, w.name"
        ))
        .bind(company_id)
        .fetch_all(executor)
        .await?;
        Ok(warehouses)
    }

    /// Warehouse by id, only if its outlet belongs to `company_id`.
    pub async fn find_warehouse<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        warehouse_id: Uuid,
    ) -> Result<Option<Warehouse>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let warehouse = sqlx::query_as::<_, Warehouse>(&format!(
            "SELECT {WAREHOUSE_COLUMNS}
               FROM warehouses w
               JOIN outlets o ON o.id = w.outlet_id
              WHERE w.id = $1
                AND o.company_id = $2
                AND w.deleted_at IS NULL"
        ))
        .bind(warehouse_id)
        .bind(company_id)
        .fetch_optional(executor)
        .await?;
        Ok(warehouse)
    }
}
