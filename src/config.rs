// src/config.rs

use anyhow::{anyhow, bail, Context};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, sync::Arc, time::Duration};

use crate::{
    db::{
        CatalogRepository, InventoryRepository, ProductRepository, SalesRepository,
        TenancyRepository, UserRepository,
    },
    services::{
        auth::AuthService, catalog_service::CatalogService, inventory_service::InventoryService,
        pricing_service::PricingService, product_service::ProductService,
        sales_service::SalesService, tenancy_service::TenancyService,
    },
};

/// Settings read from the environment (and `.env`) once at boot.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expires_in: chrono::Duration,
    pub app_env: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes `std::env`.
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = match get("DATABASE_URL") {
            Some(url) if !url.is_empty() => url,
            _ => compose_database_url(&get)?,
        };

        let jwt_secret = get("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("JWT_SECRET must be set"))?;

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().with_context(|| format!("invalid PORT '{raw}'"))?,
            None => 4000,
        };

        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("invalid DB_MAX_CONNECTIONS '{raw}'"))?,
            None => 5,
        };

        let jwt_expires_in = parse_duration(&get("JWT_EXPIRES_IN").unwrap_or_else(|| "12h".into()))?;

        Ok(Self {
            database_url,
            db_max_connections,
            port,
            jwt_secret,
            jwt_expires_in,
            app_env: get("APP_ENV").unwrap_or_else(|| "development".into()),
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }
}

fn compose_database_url<F>(get: &F) -> anyhow::Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let host = get("DB_HOST").unwrap_or_else(|| "localhost".into());
    let port = get("DB_PORT").unwrap_or_else(|| "5432".into());
    port.parse::<u16>().with_context(|| format!("invalid DB_PORT '{port}'"))?;
    let name = get("DB_NAME").unwrap_or_else(|| "pos_app".into());
    let user = get("DB_USER").unwrap_or_else(|| "pos_user".into());
    let password = get("DB_PASSWORD").unwrap_or_default();
    let ssl = get("DB_SSL").as_deref() == Some("true");

    let mut url = if password.is_empty() {
        format!("postgres://{user}@{host}:{port}/{name}")
    } else {
        format!("postgres://{user}:{password}@{host}:{port}/{name}")
    };
    if ssl {
        url.push_str("?sslmode=require");
    }
    Ok(url)
}

/// Parses token lifetimes written as `<n>s`, `<n>m`, `<n>h` or `<n>d`.
pub fn parse_duration(raw: &str) -> anyhow::Result<chrono::Duration> {
    let raw = raw.trim();
    let Some(unit) = raw.chars().last() else {
        bail!("empty duration");
    };
    let amount: i64 = raw[..raw.len() - unit.len_utf8()]
        .parse()
        .with_context(|| format!("invalid duration '{raw}'"))?;
    if amount <= 0 {
        bail!("duration must be positive, got '{raw}'");
    }

    match unit {
        's' => Ok(chrono::Duration::seconds(amount)),
        'm' => Ok(chrono::Duration::minutes(amount)),
        'h' => Ok(chrono::Duration::hours(amount)),
        'd' => Ok(chrono::Duration::days(amount)),
        other => bail!("unknown duration unit '{other}' in '{raw}'"),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub tenancy_service: TenancyService,
    pub catalog_service: CatalogService,
    pub product_service: ProductService,
    pub inventory_service: InventoryService,
    pub sales_service: SalesService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("Database connection established");

        Ok(Self::from_pool(db_pool, config))
    }

    /// Assembles the service graph around an existing pool.
    pub fn from_pool(db_pool: PgPool, config: Config) -> Self {
        let tenancy_repo = TenancyRepository::new();
        let pricing_service = PricingService::new(ProductRepository::new());
        let inventory_service = InventoryService::new(
            InventoryRepository::new(),
            tenancy_repo.clone(),
            pricing_service.clone(),
        );
        let sales_service = SalesService::new(
            SalesRepository::new(),
            tenancy_repo.clone(),
            CatalogRepository::new(),
            pricing_service,
            inventory_service.clone(),
        );

        Self {
            auth_service: AuthService::new(
                UserRepository::new(),
                tenancy_repo.clone(),
                config.jwt_secret.clone(),
                config.jwt_expires_in,
            ),
            tenancy_service: TenancyService::new(tenancy_repo),
            catalog_service: CatalogService::new(CatalogRepository::new()),
            product_service: ProductService::new(ProductRepository::new(), CatalogRepository::new()),
            inventory_service,
            sales_service,
            config: Arc::new(config),
            db_pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn parses_duration_units() {
        assert_eq!(parse_duration("12h").unwrap(), chrono::Duration::hours(12));
        assert_eq!(parse_duration("30m").unwrap(), chrono::Duration::minutes(30));
        assert_eq!(parse_duration("7d").unwrap(), chrono::Duration::days(7));
        assert_eq!(parse_duration("45s").unwrap(), chrono::Duration::seconds(45));
        assert!(parse_duration("12").is_err());
        assert!(parse_duration("h").is_err());
        assert!(parse_duration("0h").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = Config::from_lookup(lookup(&[("JWT_SECRET", "s3cret")])).unwrap();

        assert_eq!(config.port, 4000);
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.jwt_expires_in, chrono::Duration::hours(12));
        assert_eq!(config.database_url, "postgres://pos_user@localhost:5432/pos_app");
        assert!(!config.is_production());
    }

    #[test]
    fn database_url_is_composed_from_parts() {
        let config = Config::from_lookup(lookup(&[
            ("JWT_SECRET", "s3cret"),
            ("DB_HOST", "db"),
            ("DB_PORT", "6543"),
            ("DB_NAME", "shop"),
            ("DB_USER", "app"),
            ("DB_PASSWORD", "pw"),
            ("DB_SSL", "true"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "postgres://app:pw@db:6543/shop?sslmode=require");
    }

    #[test]
    fn explicit_database_url_wins() {
        let config = Config::from_lookup(lookup(&[
            ("JWT_SECRET", "s3cret"),
            ("DATABASE_URL", "postgres://x@y/z"),
            ("DB_HOST", "ignored"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "postgres://x@y/z");
    }

    #[test]
    fn missing_secret_or_bad_port_is_an_error() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
        assert!(Config::from_lookup(lookup(&[("JWT_SECRET", "s"), ("PORT", "abc")])).is_err());
    }
}
