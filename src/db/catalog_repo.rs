// src/db/catalog_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{Brand, Category, PaymentMethod, Unit},
};

const UNIT_COLUMNS: &str = "id, company_id, name, short_name, code, is_active, created_at";
const CATEGORY_COLUMNS: &str = "id, company_id, parent_id, name, code, is_active, created_at";
const BRAND_COLUMNS: &str = "id, company_id, name, code, is_active, created_at";
const PAYMENT_METHOD_COLUMNS: &str = "id, company_id, name, code, is_active, created_at";

// Small per-company lookup tables: units, categories, brands, payment methods
#[derive(Clone, Default)]
pub struct CatalogRepository;

impl CatalogRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Units
    // ---

    pub async fn create_unit<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        name: &str,
        short_name: Option<&str>,
        code: Option<&str>,
    ) -> Result<Unit, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let unit = sqlx::query_as::<_, Unit>(&format!(
            "INSERT INTO units (company_id, name, short_name, code)
             VALUES ($1, $2, $3, $4)
             RETURNING {UNIT_COLUMNS}"
        ))
        .bind(company_id)
        .bind(name)
        .bind(short_name)
        .bind(code)
        .fetch_one(executor)
        .await?;
        Ok(unit)
    }

    pub async fn list_units<'e, E>(&self, executor: E, company_id: Uuid) -> Result<Vec<Unit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let units = sqlx::query_as::<_, Unit>(&format!(
            "SELECT {UNIT_COLUMNS} FROM units
              WHERE company_id = $1 AND deleted_at IS NULL
              ORDER BY name"
        ))
        .bind(company_id)
        .fetch_all(executor)
        .await?;
        Ok(units)
    }

    pub async fn find_unit<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        unit_id: Uuid,
    ) -> Result<Option<Unit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let unit = sqlx::query_as::<_, Unit>(&format!(
            "SELECT {UNIT_COLUMNS} FROM units
              WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL"
        ))
        .bind(unit_id)
        .bind(company_id)
        .fetch_optional(executor)
        .await?;
        Ok(unit)
    }

    // ---
    // Categories
    // ---

    pub async fn create_category<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
        code: Option<&str>,
    ) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO categories (company_id, parent_id, name, code)
             VALUES ($1, $2, $3, $4)
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(company_id)
        .bind(parent_id)
        .bind(name)
        .bind(code)
        .fetch_one(executor)
        .await?;
        Ok(category)
    }

    pub async fn list_categories<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
    ) -> Result<Vec<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories
              WHERE company_id = $1 AND deleted_at IS NULL
              ORDER BY name"
        ))
        .bind(company_id)
        .fetch_all(executor)
        .await?;
        Ok(categories)
    }

    pub async fn find_category<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        category_id: Uuid,
    ) -> Result<Option<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories
              WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL"
        ))
        .bind(category_id)
        .bind(company_id)
        .fetch_optional(executor)
        .await?;
        Ok(category)
    }

    // ---
    // Brands
    // ---

    pub async fn create_brand<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        name: &str,
        code: Option<&str>,
    ) -> Result<Brand, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let brand = sqlx::query_as::<_, Brand>(&format!(
            "INSERT INTO brands (company_id, name, code)
             VALUES ($1, $2, $3)
             RETURNING {BRAND_COLUMNS}"
        ))
        .bind(company_id)
        .bind(name)
        .bind(code)
        .fetch_one(executor)
        .await?;
        Ok(brand)
    }

    pub async fn list_brands<'e, E>(&self, executor: E, company_id: Uuid) -> Result<Vec<Brand>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let brands = sqlx::query_as::<_, Brand>(&format!(
            "SELECT {BRAND_COLUMNS} FROM brands
              WHERE company_id = $1 AND deleted_at IS NULL
              ORDER BY name"
        ))
        .bind(company_id)
        .fetch_all(executor)
        .await?;
        Ok(brands)
    }

    pub async fn find_brand<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        brand_id: Uuid,
    ) -> Result<Option<Brand>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let brand = sqlx::query_as::<_, Brand>(&format!(
            "SELECT {BRAND_COLUMNS} FROM brands
              WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL"
        ))
        .bind(brand_id)
        .bind(company_id)
        .fetch_optional(executor)
        .await?;
        Ok(brand)
    }

    // ---
    // Payment methods (company-owned + global)
    // ---

    pub async fn create_payment_method<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        name: &str,
        code: Option<&str>,
    ) -> Result<PaymentMethod, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let method = sqlx::query_as::<_, PaymentMethod>(&format!(
            "INSERT INTO payment_methods (company_id, name, code)
             VALUES ($1, $2, $3)
             RETURNING {PAYMENT_METHOD_COLUMNS}"
        ))
        .bind(company_id)
        .bind(name)
        .bind(code)
        .fetch_one(executor)
        .await?;
        Ok(method)
    }

    pub async fn list_payment_methods<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
    ) -> Result<Vec<PaymentMethod>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let methods = sqlx::query_as::<_, PaymentMethod>(&format!(
            "SELECT {PAYMENT_METHOD_COLUMNS} FROM payment_methods
              WHERE (company_id = $1 OR company_id IS NULL) AND deleted_at IS NULL
              ORDER BY company_id NULLS FIRST, name"
        ))
        .bind(company_id)
        .fetch_all(executor)
        .await?;
        Ok(methods)
    }

    /// Ids among `ids` that name a payment method the company may use.
    pub async fn find_visible_payment_method_ids<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        ids: &[Uuid],
    ) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let found = sqlx::query_scalar(
            r#"
            SELECT id FROM payment_methods
             WHERE id = ANY($1)
               AND (company_id = $2 OR company_id IS NULL)
               AND deleted_at IS NULL
            "#,
        )
        .bind(ids)
        .bind(company_id)
        .fetch_all(executor)
        .await?;
        Ok(found)
    }
}
