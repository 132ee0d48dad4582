// src/services/sales_service.rs

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::json;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::MAX_MONEY,
        error::{AppError, ErrorKind},
    },
    db::{CatalogRepository, SalesRepository, TenancyRepository},
    models::{
        inventory::{MovementHeader, MovementLine, StockRefType},
        sales::{
            NewSale, NewSaleItem, NewSalePayment, PricedLine, PricedSale, SaleCreated, SaleDetail,
            SaleListFilter, SaleListItem, SaleRecord, SaleStatus,
        },
    },
    services::{
        inventory_service::InventoryService,
        pricing_service::{distinct_ids, PricingService, ResolvedPrices},
    },
};

/// Tax is not computed yet; every sale carries this amount.
pub const TAX_AMOUNT: Decimal = Decimal::ZERO;

/// Largest accepted gap between the payment sum and the sale total (0.01).
pub const PAYMENT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

const MONEY_SCALE: u32 = 2;
const DEFAULT_INVOICE_PREFIX: &str = "OUT";

#[derive(Clone)]
pub struct SalesService {
    sales_repo: SalesRepository,
    tenancy_repo: TenancyRepository,
    catalog_repo: CatalogRepository,
    pricing_service: PricingService,
    inventory_service: InventoryService,
}

impl SalesService {
    pub fn new(
        sales_repo: SalesRepository,
        tenancy_repo: TenancyRepository,
        catalog_repo: CatalogRepository,
        pricing_service: PricingService,
        inventory_service: InventoryService,
    ) -> Self {
        Self { sales_repo, tenancy_repo, catalog_repo, pricing_service, inventory_service }
    }

    /// Records a sale, its lines and payments, and the SALE movement that takes
    /// the sold quantities out of the warehouse. All of it commits together or
    /// not at all.
    pub async fn create_sale<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        input: NewSale,
    ) -> Result<SaleCreated, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let result = self.create_sale_tx(executor, company_id, input).await;

        if let Err(err) = &result {
            if err.kind() != ErrorKind::Internal {
                tracing::warn!(%company_id, code = err.code(), "sale rejected: {err}");
            }
        }
        result
    }

    async fn create_sale_tx<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        input: NewSale,
    ) -> Result<SaleCreated, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        // 0. Nothing is written for an empty cart or an unpaid sale
        if input.items.is_empty() {
            return Err(AppError::business("EMPTY_ITEMS", "Items cannot be empty"));
        }
        if input.payments.is_empty() {
            return Err(AppError::business("EMPTY_PAYMENTS", "Payments cannot be empty"));
        }

        let mut tx = executor.begin().await?;

        // 1. Outlet
        let outlet = self
            .tenancy_repo
            .find_outlet(&mut *tx, company_id, input.outlet_id)
            .await?
            .ok_or_else(|| AppError::not_found("OUTLET_NOT_FOUND", "Outlet not found"))?;

        // 2. Warehouse, through its outlet's company
        if self
            .tenancy_repo
            .find_warehouse(&mut *tx, company_id, input.warehouse_id)
            .await?
            .is_none()
        {
            return Err(AppError::not_found("WAREHOUSE_NOT_FOUND", "Warehouse not found"));
        }

        // 2b. Optional references: the shift belongs to the outlet, the customer to the company
        if let Some(shift_id) = input.shift_id {
            if self.sales_repo.find_shift_id(&mut *tx, outlet.id, shift_id).await?.is_none() {
                return Err(AppError::not_found("SHIFT_NOT_FOUND", "Shift not found"));
            }
        }
        if let Some(customer_id) = input.customer_id {
            if self
                .sales_repo
                .find_customer_id(&mut *tx, company_id, customer_id)
                .await?
                .is_none()
            {
                return Err(AppError::not_found("CUSTOMER_NOT_FOUND", "Customer not found"));
            }
        }

        // 3. Prices in one batch
        let variant_ids: Vec<Uuid> = input.items.iter().map(|i| i.variant_id).collect();
        let prices = self
            .pricing_service
            .resolve(&mut *tx, company_id, &variant_ids)
            .await?;

        // 3b. Payment methods the company may use
        let method_ids = distinct_ids(
            &input.payments.iter().map(|p| p.payment_method_id).collect::<Vec<_>>(),
        );
        let visible = self
            .catalog_repo
            .find_visible_payment_method_ids(&mut *tx, company_id, &method_ids)
            .await?;
        if let Some(missing) = method_ids.iter().find(|id| !visible.contains(id)) {
            return Err(AppError::business_with(
                "PAYMENT_METHOD_NOT_FOUND",
                "Payment method not found",
                json!({ "paymentMethodId": missing }),
            ));
        }

        // 4-5. Totals and payment reconciliation
        let priced = price_sale(&input.items, &prices)?;
        check_payments(&input.payments, priced.total_amount)?;

        // 6. Invoice number
        let invoice_number = generate_invoice_number(outlet.code.as_deref(), Utc::now());

        // 7. Header, lines, payments
        let sale_id = self
            .sales_repo
            .insert_sale(
                &mut *tx,
                &SaleRecord {
                    company_id,
                    outlet_id: outlet.id,
                    shift_id: input.shift_id,
                    customer_id: input.customer_id,
                    invoice_number: &invoice_number,
                    status: SaleStatus::Completed,
                    subtotal: priced.subtotal,
                    discount_amount: priced.discount_total,
                    tax_amount: priced.tax_amount,
                    total_amount: priced.total_amount,
                    note: input.note.as_deref(),
                },
            )
            .await?;

        for line in &priced.lines {
            self.sales_repo.insert_sale_line(&mut *tx, sale_id, line).await?;
        }

        for payment in &input.payments {
            if payment.amount <= Decimal::ZERO {
                return Err(AppError::business(
                    "INVALID_PAYMENT_AMOUNT",
                    "Payment amount must be > 0",
                ));
            }
            self.sales_repo.insert_sale_payment(&mut *tx, sale_id, payment).await?;
        }

        // 8. Stock leaves the warehouse
        let header = MovementHeader {
            company_id,
            source_warehouse_id: input.warehouse_id,
            target_warehouse_id: None,
            ref_type: StockRefType::Sale,
            ref_id: Some(sale_id),
            note: Some(format!("SALE {invoice_number}")),
        };
        let stock_movement_id = self
            .inventory_service
            .record_movement(&mut tx, &header, &sale_movement_lines(&priced.lines))
            .await?;

        // 9. Single commit point
        tx.commit().await?;

        tracing::info!(
            %sale_id,
            invoice_number = %invoice_number,
            total = %priced.total_amount,
            %stock_movement_id,
            "sale created"
        );

        Ok(SaleCreated {
            sale_id,
            invoice_number,
            total_amount: priced.total_amount,
            stock_movement_id,
        })
    }

    pub async fn get_sale_detail<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        sale_id: Uuid,
    ) -> Result<SaleDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Copy,
    {
        let header = self
            .sales_repo
            .find_sale_header(executor, company_id, sale_id)
            .await?
            .ok_or_else(|| AppError::not_found("NOT_FOUND", "Sale not found"))?;

        let lines = self.sales_repo.list_sale_lines(executor, sale_id).await?;
        let payments = self.sales_repo.list_sale_payments(executor, sale_id).await?;

        Ok(SaleDetail { header, lines, payments })
    }

    pub async fn list_sales<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        filter: &SaleListFilter,
    ) -> Result<Vec<SaleListItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.sales_repo.list_sales(executor, company_id, filter).await
    }
}

// ---
// Pure sale arithmetic
// ---

fn money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

fn amount_out_of_range() -> AppError {
    AppError::business("AMOUNT_OUT_OF_RANGE", "Amount exceeds the supported range")
}

// Totals must fit the NUMERIC(18,2) columns they are written to
fn fits_money(value: Decimal) -> Result<Decimal, AppError> {
    if value.abs() > MAX_MONEY {
        return Err(amount_out_of_range());
    }
    Ok(value)
}

/// Resolves each item's unit price and computes line and sale totals.
///
/// `subtotal` is the sum of `unit_price * qty`, `total = subtotal - discounts + tax`.
/// Money values are rounded to cents the way the store rounds `NUMERIC(18,2)`,
/// so what is returned is exactly what gets persisted.
pub fn price_sale(items: &[NewSaleItem], prices: &ResolvedPrices) -> Result<PricedSale, AppError> {
    let mut lines = Vec::with_capacity(items.len());
    let mut subtotal = Decimal::ZERO;
    let mut discount_total = Decimal::ZERO;

    for item in items {
        if item.qty <= Decimal::ZERO {
            return Err(AppError::business_with(
                "INVALID_QTY",
                "Qty must be > 0",
                json!({ "variantId": item.variant_id }),
            ));
        }

        let unit_price = prices
            .effective_unit_price(item.variant_id, item.unit_price)
            .ok_or_else(|| {
                AppError::business_with(
                    "VARIANT_NOT_FOUND",
                    "Variant not found",
                    json!({ "variantId": item.variant_id }),
                )
            })?;
        let discount_amount = item.discount_amount.unwrap_or(Decimal::ZERO);
        let gross = unit_price.checked_mul(item.qty).ok_or_else(amount_out_of_range)?;
        let line_total = money(gross.checked_sub(discount_amount).ok_or_else(amount_out_of_range)?);

        subtotal = subtotal.checked_add(gross).ok_or_else(amount_out_of_range)?;
        discount_total = discount_total
            .checked_add(discount_amount)
            .ok_or_else(amount_out_of_range)?;

        lines.push(PricedLine {
            variant_id: item.variant_id,
            qty: item.qty,
            unit_price,
            discount_amount,
            line_total: fits_money(line_total)?,
        });
    }

    let subtotal = fits_money(money(subtotal))?;
    let discount_total = fits_money(money(discount_total))?;
    let total_amount = fits_money(subtotal - discount_total + TAX_AMOUNT)?;

    Ok(PricedSale { lines, subtotal, discount_total, tax_amount: TAX_AMOUNT, total_amount })
}

/// Payments must cover the total exactly, within `PAYMENT_TOLERANCE`.
pub fn check_payments(payments: &[NewSalePayment], total_amount: Decimal) -> Result<Decimal, AppError> {
    let payment_sum = payments
        .iter()
        .try_fold(Decimal::ZERO, |sum, p| sum.checked_add(p.amount))
        .ok_or_else(amount_out_of_range)?;
    let gap = payment_sum
        .checked_sub(total_amount)
        .ok_or_else(amount_out_of_range)?;

    if gap.abs() > PAYMENT_TOLERANCE {
        return Err(AppError::business_with(
            "PAYMENT_MISMATCH",
            "Payment total must equal sale total",
            json!({ "totalAmount": total_amount, "paymentSum": payment_sum }),
        ));
    }
    Ok(payment_sum)
}

/// `{outlet code or OUT}/{YYYYMMDD}/{1000..=9999}`.
pub fn generate_invoice_number(outlet_code: Option<&str>, now: DateTime<Utc>) -> String {
    let suffix: u16 = rand::rng().random_range(1000..=9999);
    format_invoice_number(outlet_code, now, suffix)
}

fn format_invoice_number(outlet_code: Option<&str>, now: DateTime<Utc>, suffix: u16) -> String {
    let prefix = outlet_code
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_INVOICE_PREFIX);
    format!("{prefix}/{}/{suffix}", now.format("%Y%m%d"))
}

/// One negated line per sold item; unit cost is not tracked on sales.
fn sale_movement_lines(lines: &[PricedLine]) -> Vec<MovementLine> {
    lines
        .iter()
        .map(|l| MovementLine { variant_id: l.variant_id, qty_delta: -l.qty.abs(), unit_cost: None })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::products::VariantPrice;
    use chrono::TimeZone;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn prices(entries: &[(Uuid, &str)]) -> ResolvedPrices {
        let ids: Vec<Uuid> = entries.iter().map(|(id, _)| *id).collect();
        let found = entries
            .iter()
            .map(|(id, sell)| VariantPrice { id: *id, sell_price: dec(sell), cost_price: Decimal::ZERO })
            .collect();
        crate::services::pricing_service::index_prices(&ids, found).unwrap()
    }

    fn item(variant_id: Uuid, qty: &str) -> NewSaleItem {
        NewSaleItem { variant_id, qty: dec(qty), unit_price: None, discount_amount: None }
    }

    fn payment(amount: &str) -> NewSalePayment {
        NewSalePayment { payment_method_id: Uuid::new_v4(), amount: dec(amount), reference: None }
    }

    #[test]
    fn totals_follow_price_qty_and_discounts() {
        let (coffee, bread) = (Uuid::new_v4(), Uuid::new_v4());
        let prices = prices(&[(coffee, "15000"), (bread, "8000")]);

        let mut discounted = item(bread, "3");
        discounted.discount_amount = Some(dec("2000"));
        let mut overridden = item(coffee, "2");
        overridden.unit_price = Some(dec("12500"));

        let sale = price_sale(&[overridden, discounted], &prices).unwrap();

        assert_eq!(sale.lines[0].unit_price, dec("12500"));
        assert_eq!(sale.lines[0].line_total, dec("25000"));
        assert_eq!(sale.lines[1].unit_price, dec("8000"));
        assert_eq!(sale.lines[1].line_total, dec("22000"));
        assert_eq!(sale.subtotal, dec("49000"));
        assert_eq!(sale.discount_total, dec("2000"));
        assert_eq!(sale.tax_amount, TAX_AMOUNT);
        assert_eq!(sale.total_amount, sale.subtotal - sale.discount_total + sale.tax_amount);
        assert_eq!(sale.total_amount, dec("47000"));
    }

    #[test]
    fn fractional_quantities_are_rounded_to_cents() {
        let sugar = Uuid::new_v4();
        let prices = prices(&[(sugar, "3.33")]);

        let sale = price_sale(&[item(sugar, "1.5")], &prices).unwrap();

        // 3.33 * 1.5 = 4.995
        assert_eq!(sale.lines[0].line_total, dec("5.00"));
        assert_eq!(sale.total_amount, dec("5.00"));
    }

    #[test]
    fn non_positive_qty_is_rejected() {
        let v = Uuid::new_v4();
        let err = price_sale(&[item(v, "0")], &prices(&[(v, "10")])).unwrap_err();
        assert_eq!(err.code(), "INVALID_QTY");
    }

    #[test]
    fn unresolved_variant_is_rejected() {
        let err = price_sale(&[item(Uuid::new_v4(), "1")], &ResolvedPrices::default()).unwrap_err();
        assert_eq!(err.code(), "VARIANT_NOT_FOUND");
    }

    #[test]
    fn overflowing_line_is_out_of_range() {
        let v = Uuid::new_v4();
        let mut huge = item(v, "100000000000000000000");
        huge.unit_price = Some(dec("100000000000000000000"));

        let err = price_sale(&[huge], &prices(&[(v, "1")])).unwrap_err();

        assert_eq!(err.code(), "AMOUNT_OUT_OF_RANGE");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn total_beyond_the_money_column_is_out_of_range() {
        // Representable as a Decimal but wider than NUMERIC(18,2)
        let v = Uuid::new_v4();
        let prices = prices(&[(v, "10000000000")]);

        let err = price_sale(&[item(v, "10000000000")], &prices).unwrap_err();
        assert_eq!(err.code(), "AMOUNT_OUT_OF_RANGE");

        assert!(price_sale(&[item(v, "1000")], &prices).is_ok());
    }

    #[test]
    fn overflowing_payment_sum_is_out_of_range() {
        let half = "50000000000000000000000000000";
        let err = check_payments(&[payment(half), payment(half)], dec("100")).unwrap_err();
        assert_eq!(err.code(), "AMOUNT_OUT_OF_RANGE");
    }

    #[test]
    fn payments_within_one_cent_are_accepted() {
        let total = dec("100.00");
        assert_eq!(check_payments(&[payment("60"), payment("40")], total).unwrap(), total);
        assert!(check_payments(&[payment("99.99")], total).is_ok());
        assert!(check_payments(&[payment("100.01")], total).is_ok());
    }

    #[test]
    fn payment_mismatch_carries_both_amounts() {
        let err = check_payments(&[payment("99.98")], dec("100")).unwrap_err();

        assert_eq!(err.code(), "PAYMENT_MISMATCH");
        let details = err.details().unwrap();
        assert!((details["totalAmount"].as_f64().unwrap() - 100.0).abs() < 1e-9);
        assert!((details["paymentSum"].as_f64().unwrap() - 99.98).abs() < 1e-9);
    }

    #[test]
    fn invoice_number_format() {
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 23, 59, 0).unwrap();

        assert_eq!(format_invoice_number(Some("JKT01"), now, 1234), "JKT01/20250201/1234");
        assert_eq!(format_invoice_number(None, now, 9999), "OUT/20250201/9999");
        assert_eq!(format_invoice_number(Some(""), now, 1000), "OUT/20250201/1000");
    }

    #[test]
    fn generated_suffix_has_four_digits() {
        let now = Utc::now();
        for _ in 0..50 {
            let invoice = generate_invoice_number(Some("A"), now);
            let suffix: u16 = invoice.rsplit('/').next().unwrap().parse().unwrap();
            assert!((1000..=9999).contains(&suffix));
        }
    }

    #[test]
    fn sale_movement_negates_quantities() {
        let v = Uuid::new_v4();
        let lines = vec![PricedLine {
            variant_id: v,
            qty: dec("2.5"),
            unit_price: dec("10"),
            discount_amount: Decimal::ZERO,
            line_total: dec("25"),
        }];

        let movement = sale_movement_lines(&lines);

        assert_eq!(movement, vec![MovementLine { variant_id: v, qty_delta: dec("-2.5"), unit_cost: None }]);
    }
}
