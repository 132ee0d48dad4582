// src/main.rs

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use pos_backend::{
    app,
    config::{AppState, Config},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    let port = config.port;
    let production = config.is_production();

    let app_state = AppState::new(config)
        .await
        .context("failed to initialize application state")?;

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("failed to run database migrations")?;

    tracing::info!("Database migrations applied");

    if std::env::args().any(|arg| arg == "--migrate-only") {
        return Ok(());
    }

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    tracing::info!(addr = %listener.local_addr()?, production, "POS backend listening");

    axum::serve(listener, app::router(app_state))
        .await
        .context("server error")?;

    Ok(())
}
