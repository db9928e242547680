// Gatherpoll API server
// Decision: Flexible auth with support for no-auth (dev) and JWT modes
// Decision: In-memory storage when DATABASE_URL is unset

use anyhow::{Context, Result};
use gatherpoll_api::config::ServerConfig;
use gatherpoll_api::storage::StorageBackend;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // RUST_LOG overrides the default filter
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatherpoll_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("gatherpoll-api starting...");

    let config = ServerConfig::from_env().context("Failed to load configuration")?;

    let backend = StorageBackend::from_database_url(config.database_url.as_deref()).await?;
    if backend.is_dev_mode() {
        tracing::warn!("DATABASE_URL not set, using in-memory storage (data is lost on restart)");
    } else {
        tracing::info!("Connected to database");
    }

    if config.auth.is_enabled() {
        tracing::info!(mode = ?config.auth.mode, "Authentication configured");
    } else {
        tracing::warn!("Authentication disabled, organizer requests act as the dev organizer");
    }
    if !config.api_prefix.is_empty() {
        tracing::info!(prefix = %config.api_prefix, "API prefix configured");
    }
    if config.cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS origins configured");
    }

    let app = gatherpoll_api::build_app(&config, &backend);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("HTTP server listening on {}", config.bind_address);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
