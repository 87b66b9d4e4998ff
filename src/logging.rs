//! Tracing subscriber setup for binaries, benchmarks and tests.
//!
//! The library only emits `tracing` events (targets `leafpage::split`,
//! `leafpage::merge`, `leafpage::redistribute`, `leafpage::checked`); it
//! never installs a subscriber on its own.

use thiserror::Error;
use tracing_subscriber::{fmt, EnvFilter};

/// Errors raised by [`init_logging`].
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directive could not be parsed.
    #[error("invalid log level: {0}")]
    InvalidFilter(String),
    /// A global subscriber is already installed.
    #[error("logging already initialized")]
    AlreadyInitialized,
}

/// Installs a global fmt subscriber filtered by `level`
/// (an `EnvFilter` directive such as `"info"` or `"leafpage=trace"`).
pub fn init_logging(level: &str) -> Result<(), LoggingError> {
    fmt()
        .with_env_filter(
            EnvFilter::try_new(level).map_err(|e| LoggingError::InvalidFilter(e.to_string()))?,
        )
        .with_target(true)
        .with_thread_ids(true)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)
}
