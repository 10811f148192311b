//! Reporter configuration
//!
//! Controls how often metrics are flushed and how their names are built.
//!
//! # Defaults
//!
//! - `interval`: 1s
//! - `prefix`: empty
//! - `add_suffix`: true
//! - `auto_start`: true
//! - `log_errors`: false
//! - `source`: host name

use crate::{ConfigError, Result};
use serde::Deserialize;
use std::time::Duration;

/// Component name used in validation errors
const COMPONENT_NAME: &str = "default";

/// Reporter configuration
///
/// # Example
///
/// ```toml
/// [reporter]
/// interval = "5s"
/// prefix = "some.prefix"
/// add_suffix = true
/// auto_start = false
/// log_errors = true
/// source = "web-01"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReporterConfig {
    /// Flush interval
    /// Default: 1s
    #[serde(with = "humantime_serde")]
    pub interval: Duration,

    /// Prefix prepended (with a dot) to every emitted name
    /// Default: empty
    pub prefix: String,

    /// Append type suffixes such as `.count` and `.value`
    /// Default: true
    pub add_suffix: bool,

    /// Start the background ticker at construction
    /// Default: true
    pub auto_start: bool,

    /// Log failed emissions at warn level
    /// Default: false
    pub log_errors: bool,

    /// Source reported with every emission
    /// Default: host name
    pub source: Option<String>,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            prefix: String::new(),
            add_suffix: true,
            auto_start: true,
            log_errors: false,
            source: None,
        }
    }
}

impl ReporterConfig {
    /// Check the configuration for values the reporter cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(ConfigError::invalid_value(
                "reporter",
                COMPONENT_NAME,
                "interval",
                "must be greater than zero",
            ));
        }

        if let Some(source) = &self.source
            && source.trim().is_empty()
        {
            return Err(ConfigError::invalid_value(
                "reporter",
                COMPONENT_NAME,
                "source",
                "must not be blank",
            ));
        }

        Ok(())
    }
}
