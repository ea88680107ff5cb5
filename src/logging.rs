//! # Structured Logging Module
//!
//! Environment-aware structured logging to the console and, optionally, to a
//! JSON log file for following long generation waits after the fact.

use chrono::Utc;
use std::path::Path;
use std::process;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use crate::config::LoggingConfig;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
///
/// `RUST_LOG` takes precedence over the configured level. Calling this more
/// than once is harmless, and an already-installed global subscriber (for
/// example one set up by a host application) is left in place.
pub fn init_structured_logging(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment, config);

        let console_layer: Box<dyn Layer<Registry> + Send + Sync> = if config.json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .json()
                .with_filter(EnvFilter::new(&log_level))
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(true)
                .with_filter(EnvFilter::new(&log_level))
                .boxed()
        };

        let (file_layer, guard, log_file) = match config.log_dir.as_deref() {
            Some(log_dir) => match file_writer(log_dir, &environment) {
                Ok((writer, guard, log_file)) => (
                    Some(
                        fmt::layer()
                            .with_writer(writer)
                            .with_target(true)
                            .with_thread_ids(true)
                            .with_ansi(false)
                            .json()
                            .with_filter(EnvFilter::new(&log_level)),
                    ),
                    Some(guard),
                    Some(log_file),
                ),
                Err(e) => {
                    eprintln!(
                        "textgen-client: cannot create log directory {}: {}",
                        log_dir.display(),
                        e
                    );
                    (None, None, None)
                }
            },
            None => (None, None, None),
        };

        let subscriber = tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer);

        // A global subscriber may already be set by the embedding application
        if subscriber.try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        }

        tracing::info!(
            pid = process::id(),
            environment = %environment,
            level = %log_level,
            log_file = log_file.as_deref(),
            "Structured logging initialized"
        );

        // The file writer flushes until the guard drops; keep it for the process lifetime
        if let Some(guard) = guard {
            std::mem::forget(guard);
        }
    });
}

fn file_writer(
    log_dir: &Path,
    environment: &str,
) -> std::io::Result<(
    tracing_appender::non_blocking::NonBlocking,
    WorkerGuard,
    String,
)> {
    std::fs::create_dir_all(log_dir)?;

    let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
    let log_filename = format!("{}.{}.{}.log", environment, process::id(), timestamp);
    let log_file = log_dir.join(&log_filename).display().to_string();

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    Ok((writer, guard, log_file))
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("TEXTGEN_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level: `RUST_LOG`, then the configured level, then the environment default
fn get_log_level(environment: &str, config: &LoggingConfig) -> String {
    if let Ok(directive) = std::env::var("RUST_LOG") {
        if !directive.is_empty() {
            return directive;
        }
    }
    if !config.level.is_empty() {
        return config.level.clone();
    }
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for task operations
pub fn log_task_operation(
    operation: &str,
    task_id: Option<&str>,
    status: &str,
    polls: Option<u32>,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        task_id = task_id,
        status = %status,
        polls = polls,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "TASK_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_level_used_without_rust_log() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = LoggingConfig {
            level: "warn".to_string(),
            ..Default::default()
        };
        assert_eq!(get_log_level("production", &config), "warn");
    }

    #[test]
    fn test_environment_default_level() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = LoggingConfig {
            level: String::new(),
            ..Default::default()
        };
        assert_eq!(get_log_level("production", &config), "info");
        assert_eq!(get_log_level("development", &config), "debug");
        assert_eq!(get_log_level("test", &config), "debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = LoggingConfig {
            log_dir: Some(temp_dir.path().join("log")),
            ..Default::default()
        };
        init_structured_logging(&config);
        init_structured_logging(&config);
        log_task_operation("submit", Some("abc"), "accepted", None, None);
        log_error("test", "noop", "nothing went wrong", None);
    }
}
