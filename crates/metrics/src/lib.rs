//! Tally - Metrics
//!
//! In-process metric kinds and the registry the reporter reads from.
//!
//! # Overview
//!
//! This crate provides:
//! - Atomic counters and gauges
//! - Sample-based histograms (uniform and exponentially decaying reservoirs)
//! - Time-windowed histograms that summarize closed windows as centroids
//! - A concurrent name → metric registry
//! - A tagged facade over the registry with per-name tag overlays
//!
//! # Design Principles
//!
//! - **Lock-free updates** for counters and gauges
//! - **Shared handles**: metrics live behind `Arc` so application code keeps
//!   updating them while the reporter reads snapshots
//! - **Closed set of kinds**: [`Metric`] is an enum, so adding a kind is a
//!   compile-time checked change for every consumer
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//! use tally_metrics::{Counter, MetricRegistry};
//!
//! let registry = MetricRegistry::new();
//! let requests = Arc::new(Counter::new());
//! let tags = BTreeMap::from([("route".to_string(), "/checkout".to_string())]);
//!
//! registry.register("requests", requests.clone(), tags);
//! requests.inc(1);
//!
//! assert_eq!(registry.tags_for("requests")["route"], "/checkout");
//! ```

mod delta;
mod digest;
mod error;
mod gauge;
mod histogram;
mod metric;
mod registry;
mod sample;
mod tagged;
mod windowed;

pub use delta::{
    ALT_DELTA_PREFIX, DELTA_PREFIX, delta_counter_name, is_delta_counter, strip_delta_marker,
};
pub use error::{MetricsError, Result};
pub use gauge::{Gauge, GaugeFloat64};
pub use histogram::{Histogram, HistogramSnapshot};
pub use metric::Metric;
pub use registry::Registry;
pub use sample::{ExpDecaySample, Sample, SampleSnapshot, UniformSample};
pub use tagged::{MetricRegistry, RegisteredMetric, Tags};
pub use windowed::{
    Centroid, Clock, Distribution, Granularity, WindowedHistogram, WindowedHistogramBuilder,
};

use std::sync::atomic::{AtomicI64, Ordering};

/// Atomic signed counter
#[derive(Debug, Default)]
pub struct Counter(AtomicI64);

impl Counter {
    /// Create a new counter initialized to 0
    #[inline]
    pub const fn new() -> Self {
        Self(AtomicI64::new(0))
    }

    /// Increment the counter by `val`
    #[inline]
    pub fn inc(&self, val: i64) {
        self.0.fetch_add(val, Ordering::Relaxed);
    }

    /// Decrement the counter by `val`
    #[inline]
    pub fn dec(&self, val: i64) {
        self.0.fetch_sub(val, Ordering::Relaxed);
    }

    /// Get the current value
    #[inline]
    pub fn count(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }

    /// Reset the counter to 0 and return the previous value
    #[inline]
    pub fn clear(&self) -> i64 {
        self.0.swap(0, Ordering::Relaxed)
    }
}
