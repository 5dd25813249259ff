//! Sheets Proxy - REST API over a spreadsheet with an in-memory response cache

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sheets_proxy::api::create_router;
use sheets_proxy::sheets::GoogleSheetsClient;
use sheets_proxy::{spawn_sweep_task, AppState, Config};

/// Main entry point for the proxy server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache store and spreadsheet client
/// 4. Start background expiry sweep
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheets_proxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Sheets Proxy");

    let config = Config::from_env();
    info!(
        "Configuration loaded: default_ttl={}s, sweep_interval={}s, key_policy={:?}, single_flight={}, port={}",
        config.default_ttl,
        config.sweep_interval,
        config.key_policy,
        config.single_flight,
        config.server_port
    );
    if config.sheet_id.is_empty() || config.sheets_api_key.is_empty() {
        warn!("GOOGLE_SHEET_ID or GOOGLE_SHEETS_API_KEY is not set; spreadsheet calls will fail");
    }

    let source = Arc::new(GoogleSheetsClient::from_config(&config));
    let state = AppState::from_config(&config, source);
    info!("Cache store initialized");

    let sweep_handle = spawn_sweep_task(state.store().clone(), config.sweep_interval);
    info!("Background sweep task started");

    info!("CORS enabled for: {}", state.allowed_origins.join(", "));
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep task and allows graceful shutdown.
async fn shutdown_signal(sweep_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
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

    sweep_handle.abort();
    warn!("Sweep task aborted");
}
