// src/services/tenancy_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::TenancyRepository,
    models::tenancy::{Company, NewCompany, NewOutlet, NewWarehouse, Outlet, Warehouse},
};

#[derive(Clone)]
pub struct TenancyService {
    tenancy_repo: TenancyRepository,
}

impl TenancyService {
    pub fn new(tenancy_repo: TenancyRepository) -> Self {
        Self { tenancy_repo }
    }

    // --- Companies ---

    pub async fn create_company<'e, E>(&self, executor: E, input: &NewCompany) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = self.tenancy_repo.create_company(executor, input).await?;
        tracing::info!(company_id = %company.id, "company created");
        Ok(company)
    }

    /// A caller only ever sees its own company.
    pub async fn list_companies<'e, E>(&self, executor: E, company_id: Uuid) -> Result<Vec<Company>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = self.tenancy_repo.find_company(executor, company_id).await?;
        Ok(company.into_iter().collect())
    }

    pub async fn get_company<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        requested_id: Uuid,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if requested_id != company_id {
            return Err(AppError::not_found("NOT_FOUND", "Company not found"));
        }
        self.tenancy_repo
            .find_company(executor, requested_id)
            .await?
            .ok_or_else(|| AppError::not_found("NOT_FOUND", "Company not found"))
    }

    // --- Outlets ---

    pub async fn create_outlet<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        input: &NewOutlet,
    ) -> Result<Outlet, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.tenancy_repo.create_outlet(executor, company_id, input).await
    }

    pub async fn list_outlets<'e, E>(&self, executor: E, company_id: Uuid) -> Result<Vec<Outlet>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.tenancy_repo.list_outlets(executor, company_id).await
    }

    pub async fn get_outlet<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        outlet_id: Uuid,
    ) -> Result<Outlet, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.tenancy_repo
            .find_outlet(executor, company_id, outlet_id)
            .await?
            .ok_or_else(|| AppError::not_found("NOT_FOUND", "Outlet not found"))
    }

    // --- Warehouses ---

    /// The target outlet must belong to the caller's company.
    pub async fn create_warehouse<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        input: &NewWarehouse,
    ) -> Result<Warehouse, AppError>
    where
        E: Executor<'e, Database = Postgres> + Copy,
    {
        if self
            .tenancy_repo
            .find_outlet(executor, company_id, input.outlet_id)
            .await?
            .is_none()
        {
            return Err(AppError::not_found("OUTLET_NOT_FOUND", "Outlet not found"));
        }

        self.tenancy_repo.create_warehouse(executor, input).await
    }

    pub async fn list_warehouses<'e, E>(&self, executor: E, company_id: Uuid) -> Result<Vec<Warehouse>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.tenancy_repo.list_warehouses(executor, company_id).await
    }

    pub async fn get_warehouse<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        warehouse_id: Uuid,
    ) -> Result<Warehouse, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.tenancy_repo
            .find_warehouse(executor, company_id, warehouse_id)
            .await?
            .ok_or_else(|| AppError::not_found("NOT_FOUND", "Warehouse not found"))
    }
}
