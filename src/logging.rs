//! # Structured Logging Module
//!
//! Environment-aware structured logging for the readiness tracker and the
//! asynchronous check streams it manages.

use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use crate::config::{ConfigManager, LoggingConfig};
use crate::models::TaskId;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific defaults
pub fn init_structured_logging() {
    init_structured_logging_with(&LoggingConfig::default());
}

/// Initialize structured logging from a [`LoggingConfig`]
///
/// Only the first call installs a subscriber; later calls are no-ops.
pub fn init_structured_logging_with(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = ConfigManager::detect_environment();
        let filter = match (&config.level, std::env::var("RUST_LOG")) {
            (Some(level), _) => EnvFilter::new(level),
            (None, Ok(directive)) => EnvFilter::new(directive),
            (None, Err(_)) => EnvFilter::new(get_log_level(&environment)),
        };

        let layer: Box<dyn Layer<Registry> + Send + Sync> = if config.json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed()
        };

        // An embedding process may already own the global subscriber
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized, keeping it");
        }

        tracing::info!(
            environment = %environment,
            json = config.json,
            "STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "test" => "debug",
        "development" => "debug",
        "production" => "info",
        _ => "debug",
    }
}

/// Log a task moving forward in its readiness progression
pub fn log_task_transition(task_id: &TaskId, from: &str, to: &str, details: Option<&str>) {
    tracing::info!(
        task_id = %task_id,
        from = %from,
        to = %to,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "TASK_TRANSITION"
    );
}

/// Log structured data for readiness check operations
pub fn log_check_operation(
    operation: &str,
    task_id: &TaskId,
    check_name: Option<&str>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        task_id = %task_id,
        check_name = check_name,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "CHECK_OPERATION"
    );
}

/// Log structured data for subscription registry operations
pub fn log_subscription_operation(
    operation: &str,
    task_id: Option<&TaskId>,
    check_name: Option<&str>,
    open_count: usize,
) {
    tracing::debug!(
        operation = %operation,
        task_id = task_id.map(tracing::field::display),
        check_name = check_name,
        open_count = open_count,
        timestamp = %Utc::now().to_rfc3339(),
        "SUBSCRIPTION_OPERATION"
    );
}
