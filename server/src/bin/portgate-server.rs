//! PortGate Server
//!
//! Main server process for the booking and gate-admission engine.
//!
//! This binary:
//! - Loads configuration from the environment (`.env` supported)
//! - Builds the engine on the configured storage backend
//! - Starts the Prometheus metrics exporter
//! - Serves the HTTP API until Ctrl+C
//!
//! # Usage
//!
//! ```bash
//! # In-memory backend, no external ledger
//! cargo run --bin portgate-server
//!
//! # Postgres backend with a notarization ledger
//! STORAGE_BACKEND=postgres DATABASE_URL=postgres://localhost/portgate \
//!     NOTARY_LEDGER_URL=https://ledger.internal/anchor \
//!     cargo run --bin portgate-server
//! ```

use portgate_server::{AppState, Config, build_router, metrics};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,portgate_server=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting PortGate server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(backend = ?config.storage.backend, port = config.server.port,
        "Configuration loaded");

    // Metrics exporter
    let metrics_addr: SocketAddr =
        format!("{}:{}", config.server.metrics_host, config.server.metrics_port).parse()?;
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()?;
    metrics::register_business_metrics();
    tracing::info!(%metrics_addr, "Metrics exporter listening");

    // Build the engine and router
    let state = AppState::from_config(&config).await?;
    let router = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "PortGate server is running");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down gracefully...");
        })
        .await?;

    Ok(())
}
