// src/app.rs

use axum::{
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers::{auth, catalog, health, inventory, products, sales, tenancy},
    middleware::auth::auth_guard,
};

/// Builds the full HTTP surface around a ready `AppState`.
pub fn router(app_state: AppState) -> Router {
    let protected = Router::new()
        // --- Tenancy ---
        .route("/companies", get(tenancy::list_companies))
        .route("/companies/{id}", get(tenancy::get_company))
        .route("/outlets", post(tenancy::create_outlet).get(tenancy::list_outlets))
        .route("/outlets/{id}", get(tenancy::get_outlet))
        .route("/warehouses", post(tenancy::create_warehouse).get(tenancy::list_warehouses))
        .route("/warehouses/{id}", get(tenancy::get_warehouse))
        // --- Catalog ---
        .route("/units", post(catalog::create_unit).get(catalog::list_units))
        .route("/units/{id}", get(catalog::get_unit))
        .route("/categories", post(catalog::create_category).get(catalog::list_categories))
        .route("/categories/{id}", get(catalog::get_category))
        .route("/brands", post(catalog::create_brand).get(catalog::list_brands))
        .route("/brands/{id}", get(catalog::get_brand))
        .route(
            "/payment-methods",
            post(catalog::create_payment_method).get(catalog::list_payment_methods),
        )
        // --- Products ---
        .route("/products", post(products::create_product).get(products::list_products))
        .route("/products/full", post(products::create_product_full))
        .route("/products/variants", post(products::create_variant))
        .route("/products/barcodes", post(products::add_barcode))
        // --- Inventory ---
        .route("/inventory/warehouse/{id}", get(inventory::get_inventory_by_warehouse))
        .route("/inventory/warehouse/{id}/reconcile", get(inventory::reconcile_warehouse))
        .route("/inventory/adjust", post(inventory::adjust_stock))
        // --- Sales ---
        .route("/sales", post(sales::create_sale).get(sales::list_sales))
        .route("/sales/{id}", get(sales::get_sale))
        .route_layer(from_fn_with_state(app_state.clone(), auth_guard));

    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/register-owner", post(auth::register_owner))
        .route("/auth/login", post(auth::login))
        // Bootstrap: a company exists before its first user
        .route("/companies", post(tenancy::create_company));

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "Route not found",
            "error": { "code": "NOT_FOUND", "details": null },
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, models::auth::User};
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use uuid::Uuid;

    // Auth and role rejections happen before any query, so the pool never connects
    fn test_state() -> AppState {
        let config = Config::from_lookup(|key| match key {
            "JWT_SECRET" => Some("router-test-secret".to_string()),
            _ => None,
        })
        .unwrap();
        let pool = PgPoolOptions::new().connect_lazy(&config.database_url).unwrap();
        AppState::from_pool(pool, config)
    }

    fn token_for(state: &AppState, role: &str) -> String {
        let user = User {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            full_name: "Test User".into(),
            username: "tester".into(),
            email: None,
            password_hash: String::new(),
            is_active: true,
            created_at: chrono::Utc::now(),
        };
        state.auth_service.create_token(&user, vec![role.to_string()]).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn protected_route_without_token_is_401() {
        let response = router(test_state())
            .oneshot(Request::get("/sales").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["success"], Value::Bool(false));
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn garbage_token_is_401() {
        let response = router(test_state())
            .oneshot(
                Request::get("/products")
                    .header("Authorization", "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn cashier_cannot_use_owner_routes() {
        let state = test_state();
        let token = token_for(&state, "KASIR");

        for uri in ["/outlets", "/inventory/adjust", "/products"] {
            let response = router(state.clone())
                .oneshot(
                    Request::post(uri)
                        .header("Authorization", format!("Bearer {token}"))
                        .header("Content-Type", "application/json")
                        .body(Body::from("{}"))
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
            assert_eq!(body_json(response).await["error"]["code"], "FORBIDDEN");
        }
    }

    #[tokio::test]
    async fn unknown_role_cannot_sell() {
        let state = test_state();
        let token = token_for(&state, "AUDITOR");

        let response = router(state)
            .oneshot(
                Request::get("/sales")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unknown_route_uses_the_error_envelope() {
        let response = router(test_state())
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn company_bootstrap_is_public_but_listing_is_not() {
        let state = test_state();

        // Malformed body: rejected by the JSON extractor, not by auth
        let response = router(state.clone())
            .oneshot(
                Request::post("/companies")
                    .header("Content-Type", "application/json")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = router(state)
            .oneshot(Request::get("/companies").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
