//! Telemetry and logging initialization.
//!
//! Sets up structured logging with tracing and optional JSON or file output.

use crate::config::LoggingConfig;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// The file writer's guard must live for the whole program.
static LOG_GUARD: Mutex<Option<tracing_appender::non_blocking::WorkerGuard>> = Mutex::new(None);

/// Build the filter, letting `RUST_LOG` override the configured level.
fn build_filter(level: &str) -> anyhow::Result<EnvFilter> {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.is_empty() => Ok(EnvFilter::try_new(directives)?),
        _ => Ok(EnvFilter::try_new(level)?),
    }
}

/// Initialize telemetry from the logging section of the node config.
pub fn init_telemetry(config: &LoggingConfig) -> anyhow::Result<()> {
    if let Some(path) = &config.log_file {
        return init_telemetry_with_file(&config.level, path, config.format == "json");
    }

    let filter = build_filter(&config.level)?;
    if config.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .try_init()?;
    }

    Ok(())
}

/// Initialize telemetry with file output.
pub fn init_telemetry_with_file(
    level: &str,
    log_file: &std::path::Path,
    json_format: bool,
) -> anyhow::Result<()> {
    let filter = build_filter(level)?;

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(|e| anyhow::anyhow!("Failed to open log file '{}': {}", log_file.display(), e))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(non_blocking))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .try_init()?;
    }

    if let Ok(mut g) = LOG_GUARD.lock() {
        *g = Some(guard);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_rejected() {
        std::env::remove_var(EnvFilter::DEFAULT_ENV);
        assert!(build_filter("info").is_ok());
        assert!(build_filter("votedao=debug,warn").is_ok());
        assert!(build_filter("votedao=loud").is_err());
    }
}
