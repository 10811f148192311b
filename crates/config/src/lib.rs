//! Tally Configuration
//!
//! TOML-based configuration for the metrics reporter with sensible defaults.
//! An empty document is a valid configuration.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use tally_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[reporter]\nprefix = \"app\"").unwrap();
//! assert_eq!(config.reporter.prefix, "app");
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! [reporter]
//! interval = "10s"
//! prefix = "some.prefix"
//! add_suffix = true
//! auto_start = true
//! log_errors = true
//! source = "web-01"
//!
//! [application]
//! application = "checkout"
//! service = "payments"
//! cluster = "us-west"
//!
//! [application.custom_tags]
//! team = "billing"
//! ```

mod application;
mod error;
mod reporter;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use application::ApplicationConfig;
pub use error::{ConfigError, Result};
pub use reporter::ReporterConfig;

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reporting engine settings (interval, naming, lifecycle)
    pub reporter: ReporterConfig,

    /// Application identity attached to every emission
    pub application: ApplicationConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML, or
    /// fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.reporter.validate()?;
        Ok(config)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.reporter.interval, Duration::from_secs(1));
        assert!(config.reporter.prefix.is_empty());
        assert!(config.application.application.is_empty());
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
[reporter]
interval = "10s"
prefix = "some.prefix"
log_errors = true
source = "web-01"

[application]
application = "checkout"
service = "payments"
cluster = "us-west"

[application.custom_tags]
team = "billing"
"#;
        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.reporter.interval, Duration::from_secs(10));
        assert_eq!(config.reporter.prefix, "some.prefix");
        assert!(config.reporter.log_errors);
        assert_eq!(config.reporter.source.as_deref(), Some("web-01"));
        assert_eq!(config.application.service, "payments");
        assert_eq!(
            config.application.custom_tags.get("team").map(String::as_str),
            Some("billing")
        );
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result = Config::from_str("[reporter]\ninterval = \"0s\"");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_str("[reporter\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let path = temp_dir.path().join("tally.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[reporter]\nprefix = \"from-file\"").unwrap();
        drop(file);

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.reporter.prefix, "from-file");
    }

    #[test]
    fn test_from_missing_file() {
        let result = Config::from_file("/nonexistent/tally.toml");
        match result {
            Err(ConfigError::IoError { path, .. }) => assert!(path.contains("tally.toml")),
            other => panic!("expected IoError, got {:?}", other),
        }
    }
}
