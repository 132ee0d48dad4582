// tests/ledger.rs
//
// Run with `cargo test -- --ignored` against a Postgres `DATABASE_URL`.

mod common;

use common::{dec, seed};
use pos_backend::models::inventory::{StockAdjustLine, StockAdjustment};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn signed_lines_of_one_movement_sum_into_the_balance(pool: PgPool) {
    let shop = seed(pool, "LDG1", "10000").await;

    let movement_id = shop.adjust(&["10", "-3"]).await;

    assert_eq!(shop.balance().await, dec("7"));

    let lines: Vec<Decimal> = sqlx::query_scalar(
        "SELECT qty FROM stock_movement_lines WHERE stock_movement_id = $1 ORDER BY qty DESC",
    )
    .bind(movement_id)
    .fetch_all(&shop.state.db_pool)
    .await
    .unwrap();
    assert_eq!(lines, vec![dec("10"), dec("-3")]);

    let ref_type: String = sqlx::query_scalar("SELECT ref_type::text FROM stock_movements WHERE id = $1")
        .bind(movement_id)
        .fetch_one(&shop.state.db_pool)
        .await
        .unwrap();
    assert_eq!(ref_type, "ADJUSTMENT");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn concurrent_adjustments_never_lose_an_update(pool: PgPool) {
    let shop = seed(pool, "LDG2", "10000").await;

    let (a, b) = tokio::join!(shop.adjust(&["1"]), shop.adjust(&["1"]));

    assert_ne!(a, b);
    assert_eq!(shop.balance().await, dec("2"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn stock_may_go_negative(pool: PgPool) {
    let shop = seed(pool, "LDG3", "10000").await;

    shop.adjust(&["-4"]).await;

    assert_eq!(shop.balance().await, dec("-4"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn unknown_variant_rolls_back_the_whole_adjustment(pool: PgPool) {
    let shop = seed(pool, "LDG4", "10000").await;

    let err = shop
        .state
        .inventory_service
        .adjust_stock(
            &shop.state.db_pool,
            shop.company_id,
            StockAdjustment {
                warehouse_id: shop.warehouse_id,
                note: None,
                lines: vec![
                    StockAdjustLine { variant_id: shop.variant_id, qty_diff: dec("5"), unit_cost: None },
                    StockAdjustLine { variant_id: Uuid::new_v4(), qty_diff: dec("5"), unit_cost: None },
                ],
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.code(), "VARIANT_NOT_FOUND");
    assert_eq!(shop.count("stock_movements").await, 0);
    assert_eq!(shop.count("inventory_balances").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn other_tenants_warehouse_is_not_found(pool: PgPool) {
    let shop = seed(pool.clone(), "LDG5", "10000").await;
    let other = seed(pool, "LDG6", "10000").await;

    let err = shop
        .state
        .inventory_service
        .adjust_stock(
            &shop.state.db_pool,
            shop.company_id,
            StockAdjustment {
                warehouse_id: other.warehouse_id,
                note: None,
                lines: vec![StockAdjustLine { variant_id: shop.variant_id, qty_diff: dec("1"), unit_cost: None }],
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.code(), "NOT_FOUND");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn balances_reconcile_with_the_ledger(pool: PgPool) {
    let shop = seed(pool, "LDG7", "10000").await;

    shop.adjust(&["12"]).await;
    shop.adjust(&["-2", "0.5"]).await;
    shop.state
        .sales_service
        .create_sale(&shop.state.db_pool, shop.company_id, shop.sale("3", "30000"))
        .await
        .unwrap();

    let drift = shop
        .state
        .inventory_service
        .reconcile_warehouse(&shop.state.db_pool, shop.company_id, shop.warehouse_id)
        .await
        .unwrap();
    assert!(drift.is_empty(), "{drift:?}");
    assert_eq!(shop.balance().await, dec("7.5"));

    // Tampering with the cached balance shows up as drift
    sqlx::query("UPDATE inventory_balances SET qty = qty + 1")
        .execute(&shop.state.db_pool)
        .await
        .unwrap();
    let drift = shop
        .state
        .inventory_service
        .reconcile_warehouse(&shop.state.db_pool, shop.company_id, shop.warehouse_id)
        .await
        .unwrap();
    assert_eq!(drift.len(), 1);
    assert_eq!(drift[0].balance_qty - drift[0].ledger_qty, Decimal::ONE);
}
