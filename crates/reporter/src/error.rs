//! Reporter error types.

use tally_config::ConfigError;
use thiserror::Error;

/// Errors returned by a [`Sender`](crate::Sender) for a single emission.
#[derive(Debug, Error)]
pub enum SenderError {
    /// The metric name cannot be put on the wire
    #[error("invalid metric name '{0}'")]
    InvalidName(String),

    /// The backend refused the emission
    #[error("rejected by backend: {0}")]
    Rejected(String),

    /// Network or protocol failure
    #[error("transport error: {0}")]
    Transport(String),

    /// The sender was closed
    #[error("sender is closed")]
    Closed,
}

/// Errors that can occur while building or starting a reporter.
#[derive(Debug, Error)]
pub enum ReporterError {
    /// Configuration rejected at construction
    #[error("invalid reporter configuration: {0}")]
    Config(#[from] ConfigError),

    /// `start()` was called outside a Tokio runtime
    #[error("no tokio runtime available to run the reporter")]
    NoRuntime,

    /// `start()` was called after `close()`
    #[error("reporter is closed")]
    Closed,
}
