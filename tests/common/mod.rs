// tests/common/mod.rs

#![allow(dead_code)]

use pos_backend::{
    config::{AppState, Config},
    db::InventoryRepository,
    models::{
        inventory::{StockAdjustLine, StockAdjustment},
        products::{NewBarcode, NewProduct, NewVariant, NewVariantWithBarcodes},
        sales::{NewSale, NewSaleItem, NewSalePayment},
        tenancy::{NewCompany, NewOutlet, NewWarehouse},
    },
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// One tenant with an outlet, a warehouse, a sellable variant and a payment method.
pub struct Shop {
    pub state: AppState,
    pub company_id: Uuid,
    pub outlet_id: Uuid,
    pub warehouse_id: Uuid,
    pub variant_id: Uuid,
    pub payment_method_id: Uuid,
}

pub fn state(pool: PgPool) -> AppState {
    let config = Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some("integration-secret".to_string()),
        _ => None,
    })
    .unwrap();
    AppState::from_pool(pool, config)
}

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub async fn seed(pool: PgPool, code: &str, sell_price: &str) -> Shop {
    let state = state(pool);
    let db = &state.db_pool;

    let company = state
        .tenancy_service
        .create_company(
            db,
            &NewCompany { name: format!("Toko {code}"), code: Some(code.into()), tax_id: None, address: None },
        )
        .await
        .unwrap();

    let outlet = state
        .tenancy_service
        .create_outlet(
            db,
            company.id,
            &NewOutlet { name: "Main".into(), code: Some(code.into()), address: None, phone: None },
        )
        .await
        .unwrap();

    let warehouse = state
        .tenancy_service
        .create_warehouse(
            db,
            company.id,
            &NewWarehouse { outlet_id: outlet.id, name: "Back room".into(), code: None, kind: None },
        )
        .await
        .unwrap();

    let product = state
        .product_service
        .create_product_full(
            db,
            company.id,
            &NewProduct {
                category_id: None,
                brand_id: None,
                name: "Kopi".into(),
                code: None,
                description: None,
                is_service: false,
            },
            &[NewVariantWithBarcodes {
                variant: NewVariant {
                    name: Some("Regular".into()),
                    sku: Some(format!("{code}-KOPI")),
                    unit_id: None,
                    cost_price: dec("6000"),
                    sell_price: dec(sell_price),
                },
                barcodes: vec![NewBarcode { barcode: format!("{code}-0001"), is_primary: true }],
            }],
        )
        .await
        .unwrap();

    let method = state
        .catalog_service
        .create_payment_method(db, company.id, "Cash", Some("CASH"))
        .await
        .unwrap();

    Shop {
        company_id: company.id,
        outlet_id: outlet.id,
        warehouse_id: warehouse.id,
        variant_id: product.variants[0].variant.id,
        payment_method_id: method.id,
        state,
    }
}

impl Shop {
    pub async fn adjust(&self, qty_diffs: &[&str]) -> Uuid {
        self.state
            .inventory_service
            .adjust_stock(
                &self.state.db_pool,
                self.company_id,
                StockAdjustment {
                    warehouse_id: self.warehouse_id,
                    note: Some("opname".into()),
                    lines: qty_diffs
                        .iter()
                        .map(|q| StockAdjustLine { variant_id: self.variant_id, qty_diff: dec(q), unit_cost: None })
                        .collect(),
                },
            )
            .await
            .unwrap()
            .stock_movement_id
    }

    pub fn sale(&self, qty: &str, amount: &str) -> NewSale {
        NewSale {
            outlet_id: self.outlet_id,
            warehouse_id: self.warehouse_id,
            shift_id: None,
            customer_id: None,
            note: None,
            items: vec![NewSaleItem {
                variant_id: self.variant_id,
                qty: dec(qty),
                unit_price: None,
                discount_amount: None,
            }],
            payments: vec![NewSalePayment {
                payment_method_id: self.payment_method_id,
                amount: dec(amount),
                reference: None,
            }],
        }
    }

    pub async fn balance(&self) -> Decimal {
        InventoryRepository::new()
            .find_balance(&self.state.db_pool, self.warehouse_id, self.variant_id)
            .await
            .unwrap()
            .map(|b| b.qty)
            .unwrap_or(Decimal::ZERO)
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.state.db_pool)
            .await
            .unwrap()
    }
}
