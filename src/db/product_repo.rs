// src/db/product_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::products::{
        NewBarcode, NewProduct, NewVariant, Product, ProductBarcode, ProductListRow,
        ProductVariant, VariantPrice,
    },
};

const PRODUCT_COLUMNS: &str = "id, company_id, category_id, brand_id, name, code, description, \
                               is_service, is_active, created_at";
const VARIANT_COLUMNS: &str =
    "id, product_id, name, sku, unit_id, cost_price, sell_price, is_active, created_at";
const BARCODE_COLUMNS: &str = "id, variant_id, barcode, is_primary";

#[derive(Clone, Default)]
pub struct ProductRepository;

impl ProductRepository {
    pub fn new() -> Self {
        Self
    }

    // --- Reads ---

    /// Flat product x variant x barcode join; the service folds it into a tree.
    pub async fn list_product_rows<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
    ) -> Result<Vec<ProductListRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, ProductListRow>(
            r#"
            SELECT
                p.id          AS product_id,
                p.company_id,
                p.category_id,
                p.brand_id,
                p.name        AS product_name,
                p.code        AS product_code,
                p.description,
                p.is_service,
                p.is_active   AS product_is_active,
                p.created_at  AS product_created_at,
                v.id          AS variant_id,
                v.name        AS variant_name,
                v.sku,
                v.unit_id,
                v.cost_price,
                v.sell_price,
                v.is_active   AS variant_is_active,
                v.created_at  AS variant_created_at,
                b.id          AS barcode_id,
                b.barcode,
                b.is_primary
              FROM products p
              LEFT JOIN product_variants v
                     ON v.product_id = p.id AND v.deleted_at IS NULL
              LEFT JOIN product_barcodes b
                     ON b.variant_id = v.id
             WHERE p.company_id = $1
               AND p.deleted_at IS NULL
             ORDER BY p.name, p.id, v.name NULLS FIRST, v.id, b.is_primary DESC, b.barcode
            "#,
        )
        .bind(company_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn find_product<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
              WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL"
        ))
        .bind(product_id)
        .bind(company_id)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    /// Variant by id, only if its product belongs to `company_id`.
    pub async fn find_variant<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        variant_id: Uuid,
    ) -> Result<Option<ProductVariant>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let variant = sqlx::query_as::<_, ProductVariant>(
            r#"
            SELECT v.id, v.product_id, v.name, v.sku, v.unit_id, v.cost_price, v.sell_price,
                   v.is_active, v.created_at
              FROM product_variants v
              JOIN products p ON p.id = v.product_id
             WHERE v.id = $1
               AND p.company_id = $2
               AND v.deleted_at IS NULL
               AND p.deleted_at IS NULL
            "#,
        )
        .bind(variant_id)
        .bind(company_id)
        .fetch_optional(executor)
        .await?;
        Ok(variant)
    }

    /// Batch price lookup. Ids that are unknown, soft-deleted or owned by
    /// another company are simply absent from the result.
    pub async fn find_variant_prices<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        variant_ids: &[Uuid],
    ) -> Result<Vec<VariantPrice>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let prices = sqlx::query_as::<_, VariantPrice>(
            r#"
            SELECT v.id, v.sell_price, v.cost_price
              FROM product_variants v
              JOIN products p ON p.id = v.product_id
             WHERE v.id = ANY($1)
               AND p.company_id = $2
               AND v.deleted_at IS NULL
               AND p.deleted_at IS NULL
            "#,
        )
        .bind(variant_ids)
        .bind(company_id)
        .fetch_all(executor)
        .await?;
        Ok(prices)
    }

    pub async fn list_barcodes<'e, E>(
        &self,
        executor: E,
        variant_id: Uuid,
    ) -> Result<Vec<ProductBarcode>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let barcodes = sqlx::query_as::<_, ProductBarcode>(&format!(
            "SELECT {BARCODE_COLUMNS} FROM product_barcodes
              WHERE variant_id = $1
              ORDER BY is_primary DESC, barcode"
        ))
        .bind(variant_id)
        .fetch_all(executor)
        .await?;
        Ok(barcodes)
    }

    // --- Writes ---

    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        input: &NewProduct,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (company_id, category_id, brand_id, name, code, description, is_service)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(company_id)
        .bind(input.category_id)
        .bind(input.brand_id)
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.description)
        .bind(input.is_service)
        .fetch_one(executor)
        .await?;
        Ok(product)
    }

    pub async fn create_variant<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        input: &NewVariant,
    ) -> Result<ProductVariant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let variant = sqlx::query_as::<_, ProductVariant>(&format!(
            "INSERT INTO product_variants (product_id, name, sku, unit_id, cost_price, sell_price)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {VARIANT_COLUMNS}"
        ))
        .bind(product_id)
        .bind(&input.name)
        .bind(&input.sku)
        .bind(input.unit_id)
        .bind(input.cost_price)
        .bind(input.sell_price)
        .fetch_one(executor)
        .await?;
        Ok(variant)
    }

    pub async fn create_barcode<'e, E>(
        &self,
        executor: E,
        variant_id: Uuid,
        input: &NewBarcode,
    ) -> Result<ProductBarcode, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let barcode = sqlx::query_as::<_, ProductBarcode>(&format!(
            "INSERT INTO product_barcodes (variant_id, barcode, is_primary)
             VALUES ($1, $2, $3)
             RETURNING {BARCODE_COLUMNS}"
        ))
        .bind(variant_id)
        .bind(&input.barcode)
        .bind(input.is_primary)
        .fetch_one(executor)
        .await?;
        Ok(barcode)
    }

    /// Clears the primary flag on every barcode of the variant.
    pub async fn unset_primary_barcodes<'e, E>(
        &self,
        executor: E,
        variant_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE product_barcodes SET is_primary = FALSE WHERE variant_id = $1 AND is_primary",
        )
        .bind(variant_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
