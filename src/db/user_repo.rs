// src/db/user_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::conflict_on_unique, error::AppError},
    models::auth::{Role, User},
};

const USER_COLUMNS: &str =
    "id, company_id, full_name, username, email, password_hash, is_active, created_at";

// Everything that touches `users`, `roles` and `user_roles`
#[derive(Clone, Default)]
pub struct UserRepository;

impl UserRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_username<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        username: &str,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users
              WHERE company_id = $1 AND username = $2 AND deleted_at IS NULL
              LIMIT 1"
        ))
        .bind(company_id)
        .bind(username)
        .fetch_optional(executor)
        .await?;

        Ok(user)
    }

    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        full_name: &str,
        username: &str,
        email: Option<&str>,
        password_hash: &str,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (company_id, full_name, username, email, password_hash)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(company_id)
        .bind(full_name)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(executor)
        .await
        .map_err(conflict_on_unique("USERNAME_TAKEN", "Username already exists"))
    }

    /// True when the company already has a company-wide OWNER.
    pub async fn company_has_owner<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                  FROM user_roles ur
                  JOIN roles r ON r.id = ur.role_id
                  JOIN users u ON u.id = ur.user_id
                 WHERE ur.outlet_id IS NULL
                   AND r.name = 'OWNER'
                   AND u.company_id = $1
                   AND u.deleted_at IS NULL
            )
            "#,
        )
        .bind(company_id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    pub async fn assign_role<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        role: Role,
        outlet_id: Option<Uuid>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id, outlet_id)
            SELECT $1, r.id, $3 FROM roles r WHERE r.name = $2
            "#,
        )
        .bind(user_id)
        .bind(role.as_str())
        .bind(outlet_id)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(anyhow::anyhow!("role {} is not seeded", role.as_str()).into());
        }
        Ok(())
    }

    pub async fn list_role_names<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let roles = sqlx::query_scalar(
            r#"
            SELECT r.name
              FROM user_roles ur
              JOIN roles r ON r.id = ur.role_id
             WHERE ur.user_id = $1
             ORDER BY r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        Ok(roles)
    }
}
