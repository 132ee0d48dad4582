// src/services/product_service.rs

use std::collections::HashMap;

use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, ProductRepository},
    models::products::{
        NewBarcode, NewProduct, NewVariant, NewVariantWithBarcodes, Product, ProductBarcode,
        ProductListRow, ProductVariant, ProductWithVariants, VariantWithBarcodes,
    },
};

#[derive(Clone)]
pub struct ProductService {
    product_repo: ProductRepository,
    catalog_repo: CatalogRepository,
}

impl ProductService {
    pub fn new(product_repo: ProductRepository, catalog_repo: CatalogRepository) -> Self {
        Self { product_repo, catalog_repo }
    }

    pub async fn list_products<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
    ) -> Result<Vec<ProductWithVariants>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = self.product_repo.list_product_rows(executor, company_id).await?;
        Ok(group_product_rows(rows))
    }

    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        input: &NewProduct,
    ) -> Result<Product, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        self.check_product_refs(&mut tx, company_id, input).await?;
        let product = self.product_repo.create_product(&mut *tx, company_id, input).await?;

        tx.commit().await?;
        Ok(product)
    }

    /// Product, its variants and their barcodes in one transaction.
    pub async fn create_product_full<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        input: &NewProduct,
        variants: &[NewVariantWithBarcodes],
    ) -> Result<ProductWithVariants, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // 1. Product
        self.check_product_refs(&mut tx, company_id, input).await?;
        let product = self.product_repo.create_product(&mut *tx, company_id, input).await?;

        // 2. Variants + barcodes
        let mut created = Vec::with_capacity(variants.len());
        for entry in variants {
            self.check_unit(&mut tx, company_id, entry.variant.unit_id).await?;
            let variant = self
                .product_repo
                .create_variant(&mut *tx, product.id, &entry.variant)
                .await?;

            let mut barcodes = Vec::with_capacity(entry.barcodes.len());
            for barcode in &entry.barcodes {
                barcodes.push(self.insert_barcode(&mut tx, variant.id, barcode).await?);
            }
            // A later primary clears an earlier one, so re-read the final flags
            if entry.barcodes.iter().filter(|b| b.is_primary).count() > 1 {
                barcodes = self.product_repo.list_barcodes(&mut *tx, variant.id).await?;
            }

            created.push(VariantWithBarcodes { variant, barcodes });
        }

        tx.commit().await?;

        tracing::info!(product_id = %product.id, variants = created.len(), "product created");
        Ok(ProductWithVariants { product, variants: created })
    }

    /// The product must belong to the caller's company.
    pub async fn create_variant<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        product_id: Uuid,
        input: &NewVariant,
    ) -> Result<ProductVariant, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if self.product_repo.find_product(&mut *tx, company_id, product_id).await?.is_none() {
            return Err(AppError::not_found("PRODUCT_NOT_FOUND", "Product not found"));
        }
        self.check_unit(&mut tx, company_id, input.unit_id).await?;

        let variant = self.product_repo.create_variant(&mut *tx, product_id, input).await?;

        tx.commit().await?;
        Ok(variant)
    }

    /// Adds a barcode to a variant of the caller's company. A primary barcode
    /// replaces the previous primary atomically.
    pub async fn add_barcode<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        variant_id: Uuid,
        input: &NewBarcode,
    ) -> Result<ProductBarcode, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if self.product_repo.find_variant(&mut *tx, company_id, variant_id).await?.is_none() {
            return Err(AppError::not_found("VARIANT_NOT_FOUND", "Variant not found"));
        }

        let barcode = self.insert_barcode(&mut tx, variant_id, input).await?;

        tx.commit().await?;
        Ok(barcode)
    }

    // --- helpers ---

    async fn insert_barcode(
        &self,
        conn: &mut PgConnection,
        variant_id: Uuid,
        input: &NewBarcode,
    ) -> Result<ProductBarcode, AppError> {
        if input.is_primary {
            let cleared = self.product_repo.unset_primary_barcodes(&mut *conn, variant_id).await?;
            if cleared > 0 {
                tracing::debug!(%variant_id, "previous primary barcode unset");
            }
        }
        self.product_repo.create_barcode(&mut *conn, variant_id, input).await
    }

    async fn check_product_refs(
        &self,
        conn: &mut PgConnection,
        company_id: Uuid,
        input: &NewProduct,
    ) -> Result<(), AppError> {
        if let Some(category_id) = input.category_id {
            if self.catalog_repo.find_category(&mut *conn, company_id, category_id).await?.is_none() {
                return Err(AppError::not_found("CATEGORY_NOT_FOUND", "Category not found"));
            }
        }
        if let Some(brand_id) = input.brand_id {
            if self.catalog_repo.find_brand(&mut *conn, company_id, brand_id).await?.is_none() {
                return Err(AppError::not_found("BRAND_NOT_FOUND", "Brand not found"));
            }
        }
        Ok(())
    }

    async fn check_unit(
        &self,
        conn: &mut PgConnection,
        company_id: Uuid,
        unit_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        if let Some(unit_id) = unit_id {
            if self.catalog_repo.find_unit(&mut *conn, company_id, unit_id).await?.is_none() {
                return Err(AppError::not_found("UNIT_NOT_FOUND", "Unit not found"));
            }
        }
        Ok(())
    }
}

/// Folds the flat product/variant/barcode join into a tree, keeping row order.
pub fn group_product_rows(rows: Vec<ProductListRow>) -> Vec<ProductWithVariants> {
    let mut products: Vec<ProductWithVariants> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for row in rows {
        let pos = *index.entry(row.product_id).or_insert_with(|| {
            products.push(ProductWithVariants {
                product: Product {
                    id: row.product_id,
                    company_id: row.company_id,
                    category_id: row.category_id,
                    brand_id: row.brand_id,
                    name: row.product_name.clone(),
                    code: row.product_code.clone(),
                    description: row.description.clone(),
                    is_service: row.is_service,
                    is_active: row.product_is_active,
                    created_at: row.product_created_at,
                },
                variants: Vec::new(),
            });
            products.len() - 1
        });

        // LEFT JOIN: a product without variants yields NULL variant columns
        let (Some(variant_id), Some(cost_price), Some(sell_price), Some(is_active), Some(created_at)) = (
            row.variant_id,
            row.cost_price,
            row.sell_price,
            row.variant_is_active,
            row.variant_created_at,
        ) else {
            continue;
        };

        let variants = &mut products[pos].variants;
        let variant_pos = match variants.iter().position(|v| v.variant.id == variant_id) {
            Some(p) => p,
            None => {
                variants.push(VariantWithBarcodes {
                    variant: ProductVariant {
                        id: variant_id,
                        product_id: row.product_id,
                        name: row.variant_name,
                        sku: row.sku,
                        unit_id: row.unit_id,
                        cost_price,
                        sell_price,
                        is_active,
                        created_at,
                    },
                    barcodes: Vec::new(),
                });
                variants.len() - 1
            }
        };

        if let (Some(id), Some(barcode)) = (row.barcode_id, row.barcode) {
            variants[variant_pos].barcodes.push(ProductBarcode {
                id,
                variant_id,
                barcode,
                is_primary: row.is_primary.unwrap_or(false),
            });
        }
    }

    products
}
