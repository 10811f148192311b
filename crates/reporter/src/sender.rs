//! Sender boundary.
//!
//! A sender turns individual emissions into bytes on a wire. Batching,
//! retries and transport are its business; the reporter only calls it once
//! per point, delta or distribution and counts the calls that fail.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};

use tally_metrics::{Centroid, Granularity, Tags};
use tracing::{debug, info};

use crate::error::SenderError;

/// Transport for metric emissions.
pub trait Sender: Send + Sync {
    /// Send an absolute point.
    fn send_metric(
        &self,
        name: &str,
        value: f64,
        timestamp: i64,
        source: &str,
        tags: &Tags,
    ) -> Result<(), SenderError>;

    /// Send the increase of a counter since its previous report.
    fn send_delta_counter(
        &self,
        name: &str,
        value: f64,
        source: &str,
        tags: &Tags,
    ) -> Result<(), SenderError>;

    /// Send the centroids of one closed histogram window.
    fn send_distribution(
        &self,
        name: &str,
        centroids: &[Centroid],
        granularities: &BTreeSet<Granularity>,
        timestamp: i64,
        source: &str,
        tags: &Tags,
    ) -> Result<(), SenderError>;

    /// Push anything buffered to the backend.
    fn flush(&self) -> Result<(), SenderError> {
        Ok(())
    }

    /// Called when the reporter starts ticking.
    fn start(&self) {}

    /// Called once when the reporter closes.
    fn close(&self) {}
}

/// Check that `name` is a non-empty sequence of non-empty dot-separated segments.
pub fn validate_metric_name(name: &str) -> Result<(), SenderError> {
    if name.is_empty() || name.split('.').any(str::is_empty) {
        return Err(SenderError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Sender that writes every emission as a structured `tracing` event.
#[derive(Debug, Default)]
pub struct LogSender {
    closed: AtomicBool,
}

impl LogSender {
    /// Create a new log sender
    pub fn new() -> Self {
        Self::default()
    }

    fn check(&self, name: &str) -> Result<(), SenderError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SenderError::Closed);
        }
        validate_metric_name(name)
    }
}

impl Sender for LogSender {
    fn send_metric(
        &self,
        name: &str,
        value: f64,
        timestamp: i64,
        source: &str,
        tags: &Tags,
    ) -> Result<(), SenderError> {
        self.check(name)?;
        info!(metric = name, value, timestamp, source, tags = ?tags, "point");
        Ok(())
    }

    fn send_delta_counter(
        &self,
        name: &str,
        value: f64,
        source: &str,
        tags: &Tags,
    ) -> Result<(), SenderError> {
        self.check(name)?;
        info!(metric = name, value, source, tags = ?tags, "delta");
        Ok(())
    }

    fn send_distribution(
        &self,
        name: &str,
        centroids: &[Centroid],
        granularities: &BTreeSet<Granularity>,
        timestamp: i64,
        source: &str,
        tags: &Tags,
    ) -> Result<(), SenderError> {
        self.check(name)?;
        let granularities: Vec<&str> = granularities.iter().map(|g| g.wire_prefix()).collect();
        let count: u64 = centroids.iter().map(|c| c.count).sum();
        info!(
            metric = name,
            granularities = ?granularities,
            centroids = centroids.len(),
            count,
            timestamp,
            source,
            tags = ?tags,
            "distribution"
        );
        Ok(())
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!("log sender closed");
        }
    }
}
