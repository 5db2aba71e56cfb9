//! # Tabula Billing API
//!
//! HTTP server for documents, checkout and payment webhooks.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Billing API Server                               │
//! │                                                                         │
//! │  Browser ───► HTTP (8080) ───► Services ───► SQLite                    │
//! │  Stripe  ───► /api/webhooks       │                                     │
//! │                                   ▼                                     │
//! │                             Stripe REST API                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::Context;
use tabula_billing::StripeGateway;
use tabula_db::{Database, DbConfig};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use billing_api::config::ApiConfig;
use billing_api::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Tabula billing API...");

    // Load configuration
    let config = ApiConfig::load().context("invalid configuration")?;
    info!(
        bind_addr = %config.bind_addr,
        database = %config.database_path.display(),
        app_url = ?config.app_url,
        "Configuration loaded"
    );

    // Open database (runs migrations)
    let database = Database::new(DbConfig::new(config.database_path.clone()))
        .await
        .context("failed to open database")?;

    let gateway = StripeGateway::new(config.stripe.client_config())
        .context("failed to build payment processor client")?;

    let state = AppState::new(&config, database.clone(), Arc::new(gateway));
    let app = router(state);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Billing API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    database.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
///
/// A handler that cannot be installed never fires; the other still does.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
