// src/db/sales_repo.rs

use sqlx::{Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{db_utils::conflict_on_unique, error::AppError},
    models::sales::{
        PricedLine, SaleDetailLine, SaleDetailPayment, SaleHeader, SaleListFilter, SaleListItem,
        SaleRecord, NewSalePayment,
    },
};

pub const SALES_LIST_LIMIT: i64 = 200;

#[derive(Clone, Default)]
pub struct SalesRepository;

impl SalesRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Writes
    // ---

    pub async fn insert_sale<'e, E>(
        &self,
        executor: E,
        sale: &SaleRecord<'_>,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_scalar(
            r#"
            INSERT INTO sales (
                company_id, outlet_id, shift_id, customer_id, invoice_number, status,
                subtotal, discount_amount, tax_amount, total_amount, note
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(sale.company_id)
        .bind(sale.outlet_id)
        .bind(sale.shift_id)
        .bind(sale.customer_id)
        .bind(sale.invoice_number)
        .bind(sale.status)
        .bind(sale.subtotal)
        .bind(sale.discount_amount)
        .bind(sale.tax_amount)
        .bind(sale.total_amount)
        .bind(sale.note)
        .fetch_one(executor)
        .await
        .map_err(conflict_on_unique(
            "DUPLICATE_INVOICE_NUMBER",
            "Invoice number already exists for this company",
        ))
    }

    pub async fn insert_sale_line<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        line: &PricedLine,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO sale_lines (sale_id, variant_id, qty, unit_price, discount_amount, line_total)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(sale_id)
        .bind(line.variant_id)
        .bind(line.qty)
        .bind(line.unit_price)
        .bind(line.discount_amount)
        .bind(line.line_total)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn insert_sale_payment<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        payment: &NewSalePayment,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO sale_payments (sale_id, payment_method_id, amount, reference)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(sale_id)
        .bind(payment.payment_method_id)
        .bind(payment.amount)
        .bind(&payment.reference)
        .execute(executor)
        .await?;
        Ok(())
    }

    // ---
    // Sale references
    // ---

    /// Customer id when it exists under the company.
    pub async fn find_customer_id<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar(
            "SELECT id FROM customers WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL",
        )
        .bind(customer_id)
        .bind(company_id)
        .fetch_optional(executor)
        .await?;
        Ok(id)
    }

    /// Shift id when it was opened at the given outlet.
    pub async fn find_shift_id<'e, E>(
        &self,
        executor: E,
        outlet_id: Uuid,
        shift_id: Uuid,
    ) -> Result<Option<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar("SELECT id FROM shifts WHERE id = $1 AND outlet_id = $2")
            .bind(shift_id)
            .bind(outlet_id)
            .fetch_optional(executor)
            .await?;
        Ok(id)
    }

    // ---
    // Reads
    // ---

    pub async fn find_sale_header<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        sale_id: Uuid,
    ) -> Result<Option<SaleHeader>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let header = sqlx::query_as::<_, SaleHeader>(
            r#"
            SELECT
                s.id,
                s.invoice_number,
                s.sale_datetime,
                s.status,
                s.outlet_id,
                o.name AS outlet_name,
                s.customer_id,
                c.name AS customer_name,
                s.subtotal,
                s.discount_amount,
                s.tax_amount,
                s.total_amount,
                s.note
              FROM sales s
              JOIN outlets o        ON o.id = s.outlet_id
              LEFT JOIN customers c ON c.id = s.customer_id
             WHERE s.id = $1 AND s.company_id = $2
            "#,
        )
        .bind(sale_id)
        .bind(company_id)
        .fetch_optional(executor)
        .await?;
        Ok(header)
    }

    pub async fn list_sale_lines<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<Vec<SaleDetailLine>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lines = sqlx::query_as::<_, SaleDetailLine>(
            r#"
            SELECT
                sl.id,
                sl.variant_id,
                sl.qty,
                sl.unit_price,
                sl.discount_amount,
                sl.line_total,
                p.name AS product_name,
                p.code AS product_code,
                v.name AS variant_name,
                v.sku
              FROM sale_lines sl
              JOIN product_variants v ON v.id = sl.variant_id
              JOIN products p         ON p.id = v.product_id
             WHERE sl.sale_id = $1
             ORDER BY p.name, v.name NULLS FIRST
            "#,
        )
        .bind(sale_id)
        .fetch_all(executor)
        .await?;
        Ok(lines)
    }

    pub async fn list_sale_payments<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<Vec<SaleDetailPayment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payments = sqlx::query_as::<_, SaleDetailPayment>(
            r#"
            SELECT
                sp.id,
                sp.payment_method_id,
                sp.amount,
                sp.reference,
                pm.name AS payment_method_name,
                pm.code AS payment_method_code
              FROM sale_payments sp
              JOIN payment_methods pm ON pm.id = sp.payment_method_id
             WHERE sp.sale_id = $1
            "#,
        )
        .bind(sale_id)
        .fetch_all(executor)
        .await?;
        Ok(payments)
    }

    /// Newest first, capped at `SALES_LIST_LIMIT` rows.
    pub async fn list_sales<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        filter: &SaleListFilter,
    ) -> Result<Vec<SaleListItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT
                s.id,
                s.invoice_number,
                s.sale_datetime,
                o.name AS outlet_name,
                c.name AS customer_name,
                s.total_amount
              FROM sales s
              JOIN outlets o        ON o.id = s.outlet_id
              LEFT JOIN customers c ON c.id = s.customer_id
             WHERE s.company_id = "#,
        );
        builder.push_bind(company_id);

        if let Some(outlet_id) = filter.outlet_id {
            builder.push(" AND s.outlet_id = ").push_bind(outlet_id);
        }
        if let Some(from) = filter.date_from {
            builder.push(" AND s.sale_datetime >= ").push_bind(from);
        }
        if let Some(to) = filter.date_to {
            builder.push(" AND s.sale_datetime < ").push_bind(to);
        }

        builder
            .push(" ORDER BY s.sale_datetime DESC LIMIT ")
            .push_bind(SALES_LIST_LIMIT);

        let sales = builder
            .build_query_as::<SaleListItem>()
            .fetch_all(executor)
            .await?;
        Ok(sales)
    }
}
