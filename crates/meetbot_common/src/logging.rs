//! Logging setup for meetbot.
//!
//! Console output is always on. A daily rolling file (`meetbot.log.YYYY-MM-DD`)
//! is added when `log.directory` is configured, keeping at most
//! `log.max_log_files` files. On Linux the journald layer can be enabled too.
//! `RUST_LOG` overrides the configured level.

use meetbot_config::LogConfig;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{Builder as RollingBuilder, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{config_error, MeetbotError};

/// Builds the filter: `RUST_LOG` if set, otherwise `warn` for dependencies
/// and the configured level for every `meetbot*` target.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,meetbot={}", level)))
}

/// Initialize the tracing subscriber.
///
/// Must be called once at startup. The returned guard flushes the file
/// writer on drop, so the caller keeps it alive for the life of the process.
/// A second call is harmless: the existing subscriber stays in place.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>, MeetbotError> {
    let filter = build_filter(&config.level);

    let console = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let appender = RollingBuilder::new()
                .rotation(Rotation::DAILY)
                .filename_prefix("meetbot")
                .filename_suffix("log")
                .max_log_files(config.max_log_files.max(1))
                .build(directory)
                .map_err(|e| {
                    config_error(format!("cannot open log directory {}: {}", directory, e))
                })?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer);

    #[cfg(target_os = "linux")]
    let result = {
        let journald = if config.journald {
            tracing_journald::layer().ok()
        } else {
            None
        };
        registry.with(journald).try_init()
    };
    #[cfg(not(target_os = "linux"))]
    let result = registry.try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", config.level);
    }
    Ok(guard)
}

/// Log an error with context at the ERROR level.
pub fn log_error<E: std::fmt::Display>(error: E, context: &str) {
    tracing::error!("{}: {}", context, error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_console_only_is_repeatable() {
        let config = LogConfig::default();
        assert!(init(&config).unwrap().is_none());
        // Second call must not panic even though a subscriber is installed.
        assert!(init(&config).unwrap().is_none());
    }

    #[test]
    fn test_init_with_directory_returns_guard() {
        let dir = std::env::temp_dir().join(format!("meetbot-logs-{}", std::process::id()));
        let config = LogConfig {
            directory: Some(dir.to_string_lossy().to_string()),
            ..LogConfig::default()
        };
        let guard = init(&config).unwrap();
        assert!(guard.is_some());
        std::fs::remove_dir_all(dir).ok();
    }
}
