//! Startup helpers for the learning assistant server.

use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::server::{self, AppState};

/// Run the server until Ctrl-C.
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    init_tracing();

    info!("Starting learning assistant v{}", env!("CARGO_PKG_VERSION"));

    let state = match initialize() {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to start: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(server::run_server_with_shutdown(state, shutdown_signal())) {
        error!("Server error: {e}");
        return ExitCode::from(1);
    }

    info!("Server stopped");
    ExitCode::SUCCESS
}

/// Install the global subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Load configuration and build application state without starting the server.
///
/// # Errors
/// Returns an error if configuration is missing or invalid, or state creation fails.
pub fn initialize() -> Result<Arc<AppState>, Box<dyn std::error::Error + Send + Sync>> {
    let config = AppConfig::from_env().map_err(|e| format!("Invalid configuration: {e}"))?;
    info!(
        port = config.server.port,
        static_dir = %config.server.static_dir.display(),
        dev = config.expose_error_details,
        "configuration loaded"
    );
    AppState::new(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
