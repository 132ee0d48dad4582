// tests/products.rs
//
// Run with `cargo test -- --ignored` against a Postgres `DATABASE_URL`.

mod common;

use common::{dec, seed};
use pos_backend::models::products::{NewBarcode, NewProduct, NewVariant};
use sqlx::PgPool;
use uuid::Uuid;

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn new_primary_barcode_replaces_the_old_one(pool: PgPool) {
    let shop = seed(pool, "PRD1", "10000").await;
    let products = &shop.state.product_service;

    let added = products
        .add_barcode(
            &shop.state.db_pool,
            shop.company_id,
            shop.variant_id,
            &NewBarcode { barcode: "PRD1-0002".into(), is_primary: true },
        )
        .await
        .unwrap();
    assert!(added.is_primary);

    let primaries: Vec<String> = sqlx::query_scalar(
        "SELECT barcode FROM product_barcodes WHERE variant_id = $1 AND is_primary",
    )
    .bind(shop.variant_id)
    .fetch_all(&shop.state.db_pool)
    .await
    .unwrap();
    assert_eq!(primaries, vec!["PRD1-0002".to_string()]);
    assert_eq!(shop.count("product_barcodes").await, 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn secondary_barcode_keeps_the_primary(pool: PgPool) {
    let shop = seed(pool, "PRD2", "10000").await;

    shop.state
        .product_service
        .add_barcode(
            &shop.state.db_pool,
            shop.company_id,
            shop.variant_id,
            &NewBarcode { barcode: "PRD2-0002".into(), is_primary: false },
        )
        .await
        .unwrap();

    let listed = shop
        .state
        .product_service
        .list_products(&shop.state.db_pool, shop.company_id)
        .await
        .unwrap();
    let barcodes = &listed[0].variants[0].barcodes;
    assert_eq!(barcodes.len(), 2);
    // Primary first
    assert!(barcodes[0].is_primary && !barcodes[1].is_primary);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn variant_of_another_tenants_product_is_rejected(pool: PgPool) {
    let shop = seed(pool.clone(), "PRD3", "10000").await;
    let other = seed(pool, "PRD4", "10000").await;

    let other_product_id: Uuid = sqlx::query_scalar("SELECT product_id FROM product_variants WHERE id = $1")
        .bind(other.variant_id)
        .fetch_one(&shop.state.db_pool)
        .await
        .unwrap();

    let err = shop
        .state
        .product_service
        .create_variant(
            &shop.state.db_pool,
            shop.company_id,
            other_product_id,
            &NewVariant { name: None, sku: None, unit_id: None, cost_price: dec("0"), sell_price: dec("1") },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "PRODUCT_NOT_FOUND");

    let err = shop
        .state
        .product_service
        .add_barcode(
            &shop.state.db_pool,
            shop.company_id,
            other.variant_id,
            &NewBarcode { barcode: "X".into(), is_primary: false },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VARIANT_NOT_FOUND");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn unknown_category_aborts_product_creation(pool: PgPool) {
    let shop = seed(pool, "PRD5", "10000").await;

    let err = shop
        .state
        .product_service
        .create_product(
            &shop.state.db_pool,
            shop.company_id,
            &NewProduct {
                category_id: Some(Uuid::new_v4()),
                brand_id: None,
                name: "Teh".into(),
                code: None,
                description: None,
                is_service: false,
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.code(), "CATEGORY_NOT_FOUND");
    assert_eq!(shop.count("products").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn listing_nests_variants_under_products(pool: PgPool) {
    let shop = seed(pool, "PRD6", "10000").await;
    let products = &shop.state.product_service;

    let listed = products.list_products(&shop.state.db_pool, shop.company_id).await.unwrap();
    let product_id = listed[0].product.id;

    products
        .create_variant(
            &shop.state.db_pool,
            shop.company_id,
            product_id,
            &NewVariant {
                name: Some("Large".into()),
                sku: None,
                unit_id: None,
                cost_price: dec("7000"),
                sell_price: dec("12000"),
            },
        )
        .await
        .unwrap();

    let listed = products.list_products(&shop.state.db_pool, shop.company_id).await.unwrap();
    assert_eq!(listed.len(), 1);
    let names: Vec<_> = listed[0].variants.iter().map(|v| v.variant.name.clone()).collect();
    assert_eq!(names, vec![Some("Large".to_string()), Some("Regular".to_string())]);
    assert!(listed[0].variants[0].barcodes.is_empty());
}
