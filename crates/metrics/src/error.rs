//! Registry error types

use thiserror::Error;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Errors returned by the underlying [`Registry`](crate::Registry)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetricsError {
    /// A metric is already registered under this name
    #[error("duplicate metric: {0}")]
    Duplicate(String),
}
