//! Tally reporter - periodic flushing of registered metrics to a sender.
//!
//! The reporter walks a [`MetricRegistry`] on a fixed interval, turns each
//! metric into wire emissions and hands them to a [`Sender`]. Key behaviors:
//!
//! - **Non-fatal**: a failed emission is counted and skipped, never aborts a pass
//! - **Serialized**: manual and scheduled passes never overlap
//! - **Deltas**: `∆`-prefixed counters report their increase since the last pass
//! - **Windows**: windowed histograms emit one distribution per closed window
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  MetricRegistry  │────▶│   Adapter    │────▶│    Sender    │
//! │ (metrics + tags) │     │ (emissions)  │     │ (transport)  │
//! └──────────────────┘     └──────────────┘     └──────────────┘
//!                                 ▲
//!                          ┌──────────────┐
//!                          │   Reporter   │
//!                          │ (tokio tick) │
//!                          └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tally_reporter::{ApplicationConfig, Counter, LogSender, Reporter, Tags};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), tally_reporter::ReporterError> {
//! let reporter = Reporter::builder(
//!     Arc::new(LogSender::new()),
//!     ApplicationConfig::new("checkout", "api"),
//! )
//! .interval(Duration::from_secs(10))
//! .prefix("prod")
//! .build()?;
//!
//! let requests = Arc::new(Counter::new());
//! reporter
//!     .registry()
//!     .register("requests", Arc::clone(&requests), Tags::new());
//! requests.inc(1);
//!
//! reporter.close();
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod error;
pub mod naming;
pub mod reporter;
pub mod sender;
pub mod testing;

pub use adapter::{DeltaBaselines, Emission, HISTOGRAM_PERCENTILES};
pub use error::{ReporterError, SenderError};
pub use naming::Naming;
pub use reporter::{Reporter, ReporterBuilder};
pub use sender::{LogSender, Sender, validate_metric_name};

pub use tally_config::{ApplicationConfig, Config, ConfigError, ReporterConfig};
pub use tally_metrics::{
    Centroid, Counter, ExpDecaySample, Gauge, GaugeFloat64, Granularity, Histogram, Metric,
    MetricRegistry, Tags, UniformSample, WindowedHistogram, delta_counter_name,
    is_delta_counter,
};
