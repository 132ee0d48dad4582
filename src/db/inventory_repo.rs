// src/db/inventory_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::inventory::{
        BalanceDrift, InventoryBalance, InventoryRow, MovementHeader, MovementLine,
    },
};

// Ledger storage: `stock_movements`, `stock_movement_lines`, `inventory_balances`.
// Movements are append-only; balances are only ever changed by `apply_balance_delta`.
#[derive(Clone, Default)]
pub struct InventoryRepository;

impl InventoryRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Writes (always inside the caller's transaction)
    // ---

    pub async fn insert_movement<'e, E>(
        &self,
        executor: E,
        header: &MovementHeader,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar(
            r#"
            INSERT INTO stock_movements
                (company_id, source_warehouse_id, target_warehouse_id, ref_type, ref_id, note)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(header.company_id)
        .bind(header.source_warehouse_id)
        .bind(header.target_warehouse_id)
        .bind(header.ref_type)
        .bind(header.ref_id)
        .bind(&header.note)
        .fetch_one(executor)
        .await?;
        Ok(id)
    }

    pub async fn insert_movement_line<'e, E>(
        &self,
        executor: E,
        movement_id: Uuid,
        line: &MovementLine,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO stock_movement_lines (stock_movement_id, variant_id, qty, unit_cost)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(movement_id)
        .bind(line.variant_id)
        .bind(line.qty_delta)
        .bind(line.unit_cost)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Insert-or-add in a single statement. A missing row is created with
    /// `qty = delta, min_qty = 0`; an existing one has `delta` added under the
    /// row lock, so concurrent writers never lose an update.
    pub async fn apply_balance_delta<'e, E>(
        &self,
        executor: E,
        warehouse_id: Uuid,
        variant_id: Uuid,
        delta: Decimal,
    ) -> Result<InventoryBalance, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balance = sqlx::query_as::<_, InventoryBalance>(
            r#"
            INSERT INTO inventory_balances (warehouse_id, variant_id, qty, min_qty)
            VALUES ($1, $2, $3, 0)
            ON CONFLICT (warehouse_id, variant_id)
            DO UPDATE SET
                qty = inventory_balances.qty + EXCLUDED.qty,
                updated_at = NOW()
            RETURNING id, warehouse_id, variant_id, qty, min_qty, updated_at
            "#,
        )
        .bind(warehouse_id)
        .bind(variant_id)
        .bind(delta)
        .fetch_one(executor)
        .await?;
        Ok(balance)
    }

    // ---
    // Reads
    // ---

    pub async fn find_balance<'e, E>(
        &self,
        executor: E,
        warehouse_id: Uuid,
        variant_id: Uuid,
    ) -> Result<Option<InventoryBalance>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balance = sqlx::query_as::<_, InventoryBalance>(
            r#"
            SELECT id, warehouse_id, variant_id, qty, min_qty, updated_at
              FROM inventory_balances
             WHERE warehouse_id = $1 AND variant_id = $2
            "#,
        )
        .bind(warehouse_id)
        .bind(variant_id)
        .fetch_optional(executor)
        .await?;
        Ok(balance)
    }

    pub async fn list_balances_for_warehouse<'e, E>(
        &self,
        executor: E,
        warehouse_id: Uuid,
    ) -> Result<Vec<InventoryRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT
                ib.id,
                ib.warehouse_id,
                ib.variant_id,
                ib.qty,
                ib.min_qty,
                v.name  AS variant_name,
                v.sku,
                p.name  AS product_name,
                p.code  AS product_code,
                u.name  AS unit_name
              FROM inventory_balances ib
              JOIN product_variants v ON v.id = ib.variant_id
              JOIN products p         ON p.id = v.product_id
              LEFT JOIN units u       ON u.id = v.unit_id
             WHERE ib.warehouse_id = $1
             ORDER BY p.name, v.name NULLS FIRST
            "#,
        )
        .bind(warehouse_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Balances whose qty differs from the sum of committed ledger lines for
    /// the same (warehouse, variant). Pairs that only exist on one side count too.
    pub async fn balance_drift<'e, E>(
        &self,
        executor: E,
        warehouse_id: Uuid,
    ) -> Result<Vec<BalanceDrift>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let drift = sqlx::query_as::<_, BalanceDrift>(
            r#"
            WITH ledger AS (
                SELECT l.variant_id, SUM(l.qty) AS qty
                  FROM stock_movement_lines l
                  JOIN stock_movements m ON m.id = l.stock_movement_id
                 WHERE m.source_warehouse_id = $1
                 GROUP BY l.variant_id
            ),
            balances AS (
                SELECT variant_id, qty
                  FROM inventory_balances
                 WHERE warehouse_id = $1
            )
            SELECT
                COALESCE(b.variant_id, l.variant_id) AS variant_id,
                COALESCE(b.qty, 0)                   AS balance_qty,
                COALESCE(l.qty, 0)                   AS ledger_qty
              FROM balances b
              FULL OUTER JOIN ledger l ON l.variant_id = b.variant_id
             WHERE COALESCE(b.qty, 0) <> COALESCE(l.qty, 0)
             ORDER BY 1
            "#,
        )
        .bind(warehouse_id)
        .fetch_all(executor)
        .await?;
        Ok(drift)
    }
}
