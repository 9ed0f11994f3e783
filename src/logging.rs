//! # Structured Logging Module
//!
//! Process-wide `tracing` subscriber setup plus helpers that give domain
//! operations and dependency failures a consistent set of structured fields.

use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{LogFormat, LoggingConfig};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging from configuration.
///
/// `RUST_LOG` takes precedence over the configured level. Safe to call more
/// than once; only the first call installs a subscriber.
pub fn init_structured_logging(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = build_filter(&config.level);

        let layer = match config.format {
            LogFormat::Pretty => fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed(),
            LogFormat::Json => fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(filter)
                .boxed(),
        };

        // Use try_init to avoid panic if global subscriber already set
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            pid = std::process::id(),
            level = %config.level,
            format = ?config.format,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

fn build_filter(configured_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log structured data for task operations
pub fn log_task_operation(operation: &str, task_id: Option<&str>, status: &str, details: Option<&str>) {
    tracing::info!(
        operation = %operation,
        task_id = task_id,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "📋 TASK_OPERATION"
    );
}

/// Log a failed call to an outbound dependency
pub fn log_dependency_failure(dependency: &str, operation: &str, error: &str, fatal: bool) {
    if fatal {
        tracing::error!(
            dependency = %dependency,
            operation = %operation,
            error = %error,
            timestamp = %Utc::now().to_rfc3339(),
            "❌ DEPENDENCY_FAILURE"
        );
    } else {
        tracing::warn!(
            dependency = %dependency,
            operation = %operation,
            error = %error,
            timestamp = %Utc::now().to_rfc3339(),
            "⚠️ DEPENDENCY_FAILURE (isolated)"
        );
    }
}
