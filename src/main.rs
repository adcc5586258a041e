//! Record Store - A key/value record service with per-record TTL
//!
//! Binary entry point: wires configuration, storage, the record service and
//! the HTTP server together.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use record_store::api::create_router;
use record_store::{AppState, Config, MemoryRepository, RecordRepository, RecordService, SqliteRepository};

/// Main entry point for the record store server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the durable store
/// 4. Create the record service (starts reaper and stats reporter)
/// 5. Serve HTTP until SIGINT/SIGTERM
/// 6. Stop the service's background tasks
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "record_store=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Record Store");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, reaper_interval={}s, cache_enabled={}, cache_life_window={}s, cache_max_entries={}, cache_hard_max={}MiB",
        config.server_port,
        config.reaper_interval,
        config.cache_enabled,
        config.cache_life_window,
        config.cache_max_entries_in_window,
        config.cache_hard_max_mb
    );

    let repo: Arc<dyn RecordRepository> = match &config.database_path {
        Some(path) => {
            let repo = SqliteRepository::open(path)
                .with_context(|| format!("failed to open database {}", path.display()))?;
            info!("Using SQLite store at {}", path.display());
            Arc::new(repo)
        }
        None => {
            warn!("DATABASE_PATH not set, records will not survive a restart");
            Arc::new(MemoryRepository::new())
        }
    };

    let service = Arc::new(RecordService::new(repo, config.service_settings()));
    let app = create_router(AppState::new(service.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    service.shutdown().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
