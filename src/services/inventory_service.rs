// src/services/inventory_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{InventoryRepository, TenancyRepository},
    models::inventory::{
        BalanceDrift, InventoryRow, MovementHeader, MovementLine, StockAdjustLine, StockAdjusted,
        StockAdjustment, StockRefType,
    },
    services::pricing_service::PricingService,
};

#[derive(Clone)]
pub struct InventoryService {
    inventory_repo: InventoryRepository,
    tenancy_repo: TenancyRepository,
    pricing_service: PricingService,
}

impl InventoryService {
    pub fn new(
        inventory_repo: InventoryRepository,
        tenancy_repo: TenancyRepository,
        pricing_service: PricingService,
    ) -> Self {
        Self { inventory_repo, tenancy_repo, pricing_service }
    }

    // ---
    // LEDGER
    // ---

    /// Appends one movement and its lines, and folds every line into the
    /// (source warehouse, variant) balance. Runs on the caller's connection,
    /// which is expected to be inside an open transaction; nothing is committed
    /// here. Zero-delta lines are skipped.
    pub async fn record_movement(
        &self,
        conn: &mut PgConnection,
        header: &MovementHeader,
        lines: &[MovementLine],
    ) -> Result<Uuid, AppError> {
        let movement_id = self.inventory_repo.insert_movement(&mut *conn, header).await?;

        for line in lines {
            if line.qty_delta.is_zero() {
                continue;
            }

            self.inventory_repo
                .insert_movement_line(&mut *conn, movement_id, line)
                .await?;

            let balance = self
                .inventory_repo
                .apply_balance_delta(&mut *conn, header.source_warehouse_id, line.variant_id, line.qty_delta)
                .await?;

            tracing::debug!(
                %movement_id,
                warehouse_id = %header.source_warehouse_id,
                variant_id = %line.variant_id,
                delta = %line.qty_delta,
                balance = %balance.qty,
                "ledger line applied"
            );
        }

        Ok(movement_id)
    }

    pub async fn get_inventory_by_warehouse<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        warehouse_id: Uuid,
    ) -> Result<Vec<InventoryRow>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Copy,
    {
        self.ensure_warehouse(executor, company_id, warehouse_id).await?;
        self.inventory_repo.list_balances_for_warehouse(executor, warehouse_id).await
    }

    /// Balances of the warehouse that disagree with their ledger sums.
    /// Empty when the ledger invariant holds.
    pub async fn reconcile_warehouse<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        warehouse_id: Uuid,
    ) -> Result<Vec<BalanceDrift>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Copy,
    {
        self.ensure_warehouse(executor, company_id, warehouse_id).await?;
        let drift = self.inventory_repo.balance_drift(executor, warehouse_id).await?;

        if !drift.is_empty() {
            tracing::warn!(%warehouse_id, rows = drift.len(), "inventory balances drifted from ledger");
        }
        Ok(drift)
    }

    // ---
    // STOCK ADJUSTMENT
    // ---

    pub async fn adjust_stock<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        input: StockAdjustment,
    ) -> Result<StockAdjusted, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        // Rejected before any transaction is opened
        let lines = adjustment_lines(&input.lines)?;

        let mut tx = executor.begin().await?;

        // 1. Warehouse under the caller's company
        if self
            .tenancy_repo
            .find_warehouse(&mut *tx, company_id, input.warehouse_id)
            .await?
            .is_none()
        {
            return Err(AppError::not_found("NOT_FOUND", "Warehouse not found"));
        }

        // 2. Every variant must exist for this company
        let variant_ids: Vec<Uuid> = lines.iter().map(|l| l.variant_id).collect();
        self.pricing_service.resolve(&mut *tx, company_id, &variant_ids).await?;

        // 3. Ledger
        let header = MovementHeader {
            company_id,
            source_warehouse_id: input.warehouse_id,
            target_warehouse_id: None,
            ref_type: StockRefType::Adjustment,
            ref_id: None,
            note: input.note,
        };
        let stock_movement_id = self.record_movement(&mut tx, &header, &lines).await?;

        tx.commit().await?;

        tracing::info!(
            %stock_movement_id,
            warehouse_id = %input.warehouse_id,
            lines = lines.len(),
            "stock adjusted"
        );
        Ok(StockAdjusted { stock_movement_id })
    }

    async fn ensure_warehouse<'e, E>(&self, executor: E, company_id: Uuid, warehouse_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        match self.tenancy_repo.find_warehouse(executor, company_id, warehouse_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::not_found("NOT_FOUND", "Warehouse not found")),
        }
    }
}

/// Turns adjustment input into ledger lines carrying the raw signed diff.
/// Zero diffs are dropped; a request with nothing left to apply is rejected.
pub fn adjustment_lines(lines: &[StockAdjustLine]) -> Result<Vec<MovementLine>, AppError> {
    if lines.is_empty() {
        return Err(AppError::business("EMPTY_LINES", "Lines cannot be empty"));
    }

    let movement_lines: Vec<MovementLine> = lines
        .iter()
        .filter(|l| l.qty_diff != Decimal::ZERO)
        .map(|l| MovementLine {
            variant_id: l.variant_id,
            qty_delta: l.qty_diff,
            unit_cost: l.unit_cost,
        })
        .collect();

    if movement_lines.is_empty() {
        return Err(AppError::business("EMPTY_LINES", "Lines cannot all be zero"));
    }
    Ok(movement_lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(variant_id: Uuid, qty: i64) -> StockAdjustLine {
        StockAdjustLine { variant_id, qty_diff: Decimal::from(qty), unit_cost: None }
    }

    #[test]
    fn keeps_signed_diffs_and_costs() {
        let v = Uuid::new_v4();
        let mut with_cost = line(v, 10);
        with_cost.unit_cost = Some(Decimal::new(2500, 2));

        let lines = adjustment_lines(&[with_cost, line(v, -3)]).unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].qty_delta, Decimal::from(10));
        assert_eq!(lines[0].unit_cost, Some(Decimal::new(2500, 2)));
        assert_eq!(lines[1].qty_delta, Decimal::from(-3));
        // Ledger sum of the movement
        let net: Decimal = lines.iter().map(|l| l.qty_delta).sum();
        assert_eq!(net, Decimal::from(7));
    }

    #[test]
    fn zero_lines_are_skipped() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let lines = adjustment_lines(&[line(a, 0), line(b, 4)]).unwrap();

        assert_eq!(lines, vec![MovementLine { variant_id: b, qty_delta: Decimal::from(4), unit_cost: None }]);
    }

    #[test]
    fn empty_or_all_zero_is_rejected() {
        assert_eq!(adjustment_lines(&[]).unwrap_err().code(), "EMPTY_LINES");
        assert_eq!(
            adjustment_lines(&[line(Uuid::new_v4(), 0)]).unwrap_err().code(),
            "EMPTY_LINES"
        );
    }
}
