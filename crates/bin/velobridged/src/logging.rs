//! Tracing subscriber setup: an append-only log file plus stderr.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Errors raised while installing the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to open log file {path}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid log filter")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("failed to install tracing subscriber")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns [`LoggingError`] if the log file cannot be opened, the filter does
/// not parse, or a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_new(&config.filter)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.file)
        .map_err(|source| LoggingError::File {
            path: config.file.clone(),
            source,
        })?;

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    tracing::info!(file = %config.file, "logging initialized");
    Ok(())
}
