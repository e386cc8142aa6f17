//! Structured logging setup.
//!
//! `RUST_LOG` takes precedence over the configured level. JSON output is
//! the default; `pretty` is meant for local runs.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Error type for tracing initialization.
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    /// Failed to initialize tracing subscriber.
    #[error("failed to initialize tracing subscriber: {0}")]
    SubscriberError(String),
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TracingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true);

    let result = if config.format == "json" {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.pretty().try_init()
    };

    result.map_err(|e| TracingError::SubscriberError(e.to_string()))
}
