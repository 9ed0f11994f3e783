//! # Task Service Server
//!
//! Runs the REST and gRPC APIs until Ctrl+C or SIGTERM.
//!
//! ## Usage
//!
//! ```bash
//! # Run with default configuration from ./config
//! cargo run --bin task-service
//!
//! # Run with a specific environment and overrides
//! TASK_SERVICE_ENV=production TASK_SERVICE_REST__BIND_ADDRESS=0.0.0.0:9000 cargo run --bin task-service
//! ```

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};

use task_service::bootstrap::ServiceBootstrap;
use task_service::config::ConfigManager;
use task_service::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_manager = ConfigManager::load().context("Failed to load configuration")?;

    logging::init_structured_logging(&config_manager.config().logging);

    info!("🚀 Starting Task Service...");
    info!("   Version: {}", env!("CARGO_PKG_VERSION"));
    info!("   Environment: {}", config_manager.environment());
    info!(
        "   Config directory: {}",
        config_manager.config_directory().display()
    );

    let bootstrap = ServiceBootstrap::new(config_manager);
    let handle = bootstrap
        .start()
        .await
        .context("Failed to start servers")?;

    info!("🎉 Task Service started successfully!");
    info!("   REST API: http://{}", handle.rest_address());
    if let Some(grpc_address) = handle.grpc_address() {
        info!("   gRPC API: {}", grpc_address);
    }
    info!("   Press Ctrl+C to shutdown gracefully");

    shutdown_signal().await;

    info!("🛑 Shutdown signal received, initiating graceful shutdown...");
    if let Err(e) = handle.stop().await {
        error!("Failed to stop servers cleanly: {}", e);
        return Err(e.into());
    }

    info!("👋 Task Service shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received SIGTERM");
        },
    }
}
