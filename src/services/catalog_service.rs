// src/services/catalog_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CatalogRepository,
    models::catalog::{Brand, Category, PaymentMethod, Unit},
};

// Thin layer over the lookup tables; the only rule is tenant scoping.
#[derive(Clone)]
pub struct CatalogService {
    catalog_repo: CatalogRepository,
}

impl CatalogService {
    pub fn new(catalog_repo: CatalogRepository) -> Self {
        Self { catalog_repo }
    }

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
        self.catalog_repo.create_unit(executor, company_id, name, short_name, code).await
    }

    pub async fn list_units<'e, E>(&self, executor: E, company_id: Uuid) -> Result<Vec<Unit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.catalog_repo.list_units(executor, company_id).await
    }

    pub async fn get_unit<'e, E>(&self, executor: E, company_id: Uuid, unit_id: Uuid) -> Result<Unit, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.catalog_repo
            .find_unit(executor, company_id, unit_id)
            .await?
            .ok_or_else(|| AppError::not_found("NOT_FOUND", "Unit not found"))
    }

    /// A parent category, when given, must belong to the same company.
    pub async fn create_category<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
        code: Option<&str>,
    ) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Postgres> + Copy,
    {
        if let Some(parent_id) = parent_id {
            if self.catalog_repo.find_category(executor, company_id, parent_id).await?.is_none() {
                return Err(AppError::not_found("CATEGORY_NOT_FOUND", "Parent category not found"));
            }
        }
        self.catalog_repo
            .create_category(executor, company_id, parent_id, name, code)
            .await
    }

    pub async fn list_categories<'e, E>(&self, executor: E, company_id: Uuid) -> Result<Vec<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.catalog_repo.list_categories(executor, company_id).await
    }

    pub async fn get_category<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        category_id: Uuid,
    ) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.catalog_repo
            .find_category(executor, company_id, category_id)
            .await?
            .ok_or_else(|| AppError::not_found("NOT_FOUND", "Category not found"))
    }

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
        self.catalog_repo.create_brand(executor, company_id, name, code).await
    }

    pub async fn list_brands<'e, E>(&self, executor: E, company_id: Uuid) -> Result<Vec<Brand>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.catalog_repo.list_brands(executor, company_id).await
    }

    pub async fn get_brand<'e, E>(&self, executor: E, company_id: Uuid, brand_id: Uuid) -> Result<Brand, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.catalog_repo
            .find_brand(executor, company_id, brand_id)
            .await?
            .ok_or_else(|| AppError::not_found("NOT_FOUND", "Brand not found"))
    }

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
        self.catalog_repo.create_payment_method(executor, company_id, name, code).await
    }

    /// Company-owned methods plus the global ones.
    pub async fn list_payment_methods<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
    ) -> Result<Vec<PaymentMethod>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.catalog_repo.list_payment_methods(executor, company_id).await
    }
}
