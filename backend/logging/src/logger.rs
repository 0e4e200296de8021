//! Structured Logger
//!
//! Wraps `tracing` with a human-readable console layer and, when a log
//! directory is configured, a daily-rotated NDJSON file layer.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// File name prefix for rotated log files (`narrator.log.YYYY-MM-DD`).
pub const LOG_FILE_PREFIX: &str = "narrator.log";

/// Build the level filter: `RUST_LOG` wins over the configured level.
pub fn build_filter(level: &str) -> EnvFilter {
    filter_from(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(), level)
}

/// Unset or blank `rust_log` defers to `level`; unparsable input ends at `info`.
fn filter_from(rust_log: Option<&str>, level: &str) -> EnvFilter {
    rust_log
        .filter(|v| !v.trim().is_empty())
        .map(EnvFilter::try_new)
        .unwrap_or_else(|| EnvFilter::try_new(level))
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global structured logger.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logger(level: &str, log_dir: Option<&Path>) {
    let file_layer = log_dir.map(|dir| {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
        fmt::layer()
            .json()
            .with_writer(file_appender)
            .with_ansi(false)
    });

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(true);

    let _ = tracing_subscriber::registry()
        .with(build_filter(level))
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_level_applies_without_rust_log() {
        assert_eq!(filter_from(None, "debug").to_string(), "debug");
        assert_eq!(filter_from(Some("  "), "warn").to_string(), "warn");
    }

    #[test]
    fn rust_log_overrides_configured_level() {
        assert_eq!(filter_from(Some("narrator_media=trace"), "debug").to_string(), "narrator_media=trace");
    }

    #[test]
    fn unparsable_directives_fall_back() {
        assert_eq!(filter_from(Some("narrator=loud"), "error").to_string(), "error");
        assert_eq!(filter_from(None, "narrator=loud").to_string(), "info");
    }

    #[test]
    fn repeated_init_is_harmless() {
        let dir = std::env::temp_dir().join(format!("narrator-logs-{}", uuid::Uuid::new_v4()));
        init_logger("warn", Some(&dir));
        init_logger("warn", None);
        tracing::warn!("logger initialized twice");
        let _ = std::fs::remove_dir_all(&dir);
        assert!(!dir.exists());
    }
}
