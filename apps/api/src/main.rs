//! Lotus API server binary.
//!
//! Wires configuration, the database pool, and the router together, then
//! serves until SIGINT/SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lotus_api::routes::build_router;
use lotus_api::{ApiConfig, AppState, JwtManager};
use lotus_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Respect RUST_LOG, default to info.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Lotus API server...");

    let config = ApiConfig::load()?;
    info!(
        bind_addr = %config.bind_addr,
        database = %config.database_path,
        "Configuration resolved"
    );

    if config.using_dev_secret() {
        warn!("LOTUS_JWT_SECRET is not set; tokens are verified with the development fallback secret");
    }

    let addr: SocketAddr = config.bind_addr.parse()?;

    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    info!("Database ready");

    let jwt = JwtManager::new(config.jwt_secret.clone(), config.token_expiry_hours);
    let state = Arc::new(AppState { db, jwt, config });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves when the process receives SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
