//! Logging configuration and initialization.
//!
//! JSON output for production, pretty output for local runs, optionally
//! written to a file instead of stderr.

use std::path::PathBuf;
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl LogFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "pretty" | "text" => Some(Self::Pretty),
            _ => None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    /// Filter directive, e.g. `info` or `bloom_core=debug`.
    pub level: String,
    /// Log file. Stderr when None.
    pub output_path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            level: "info".to_string(),
            output_path: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),
    #[error("Failed to open log file: {0}")]
    FileOpen(String),
    #[error("Subscriber already initialized")]
    AlreadyInitialized,
}

/// Install the global tracing subscriber. Call once at startup.
pub fn init_logging(config: &LogConfig) -> Result<(), LogError> {
    let filter = build_filter(&config.level)?;

    match config.format {
        LogFormat::Json => init_json_subscriber(filter, &config.output_path),
        LogFormat::Pretty => init_pretty_subscriber(filter, &config.output_path),
    }
}

fn build_filter(level: &str) -> Result<EnvFilter, LogError> {
    EnvFilter::try_new(level).map_err(|e| LogError::InvalidFilter(e.to_string()))
}

fn open_log_file(path: &PathBuf) -> Result<std::sync::Mutex<std::fs::File>, LogError> {
    let file = std::fs::File::create(path).map_err(|e| LogError::FileOpen(e.to_string()))?;
    Ok(std::sync::Mutex::new(file))
}

fn init_json_subscriber(filter: EnvFilter, path: &Option<PathBuf>) -> Result<(), LogError> {
    let registry = tracing_subscriber::registry().with(filter);

    if let Some(path) = path {
        registry
            .with(fmt::layer().json().with_writer(open_log_file(path)?))
            .try_init()
            .map_err(|_| LogError::AlreadyInitialized)
    } else {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .map_err(|_| LogError::AlreadyInitialized)
    }
}

fn init_pretty_subscriber(filter: EnvFilter, path: &Option<PathBuf>) -> Result<(), LogError> {
    let registry = tracing_subscriber::registry().with(filter);

    if let Some(path) = path {
        registry
            .with(fmt::layer().pretty().with_ansi(false).with_writer(open_log_file(path)?))
            .try_init()
            .map_err(|_| LogError::AlreadyInitialized)
    } else {
        registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init()
            .map_err(|_| LogError::AlreadyInitialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names() {
        assert_eq!(LogFormat::from_name("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::from_name("pretty"), Some(LogFormat::Pretty));
        assert_eq!(LogFormat::from_name("xml"), None);
    }

    #[test]
    fn test_invalid_filter_rejected() {
        let err = build_filter("bloom_core=notalevel").unwrap_err();
        assert!(matches!(err, LogError::InvalidFilter(_)));
    }
}
