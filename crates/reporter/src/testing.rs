//! In-memory sender for tests and local development.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tally_metrics::{Centroid, Granularity, Tags};

use crate::error::SenderError;
use crate::sender::{Sender, validate_metric_name};

/// A recorded absolute point
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPoint {
    pub name: String,
    pub value: f64,
    pub timestamp: i64,
    pub source: String,
    pub tags: Tags,
}

/// A recorded delta counter
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDelta {
    pub name: String,
    pub value: f64,
    pub source: String,
    pub tags: Tags,
}

/// A recorded distribution
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDistribution {
    pub name: String,
    pub centroids: Vec<Centroid>,
    pub granularities: BTreeSet<Granularity>,
    pub timestamp: i64,
    pub source: String,
    pub tags: Tags,
}

/// Everything a [`RecordingSender`] accepted
#[derive(Debug, Clone, Default)]
pub struct Recorded {
    pub points: Vec<RecordedPoint>,
    pub deltas: Vec<RecordedDelta>,
    pub distributions: Vec<RecordedDistribution>,
}

/// Sender that keeps every accepted emission in memory
///
/// Names are validated like a real wire sender would, and
/// [`set_failing`](Self::set_failing) makes every call fail with
/// [`SenderError::Transport`].
#[derive(Debug, Default)]
pub struct RecordingSender {
    recorded: Mutex<Recorded>,
    failing: AtomicBool,
    started: AtomicBool,
    closed: AtomicBool,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn recorded(&self) -> Recorded {
        self.recorded.lock().clone()
    }

    /// `(distributions, points, deltas)` accepted so far
    pub fn counters(&self) -> (usize, usize, usize) {
        let recorded = self.recorded.lock();
        (
            recorded.distributions.len(),
            recorded.points.len(),
            recorded.deltas.len(),
        )
    }

    /// Points recorded under `name`, oldest first
    pub fn points_named(&self, name: &str) -> Vec<RecordedPoint> {
        self.recorded
            .lock()
            .points
            .iter()
            .filter(|p| p.name == name)
            .cloned()
            .collect()
    }

    /// Drop everything recorded so far
    pub fn reset(&self) {
        *self.recorded.lock() = Recorded::default();
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn check(&self, name: &str) -> Result<(), SenderError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SenderError::Closed);
        }
        if self.failing.load(Ordering::Relaxed) {
            return Err(SenderError::Transport("recording sender set to fail".into()));
        }
        validate_metric_name(name)
    }
}

impl Sender for RecordingSender {
    fn send_metric(
        &self,
        name: &str,
        value: f64,
        timestamp: i64,
        source: &str,
        tags: &Tags,
    ) -> Result<(), SenderError> {
        self.check(name)?;
        self.recorded.lock().points.push(RecordedPoint {
            name: name.to_string(),
            value,
            timestamp,
            source: source.to_string(),
            tags: tags.clone(),
        });
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
        self.recorded.lock().deltas.push(RecordedDelta {
            name: name.to_string(),
            value,
            source: source.to_string(),
            tags: tags.clone(),
        });
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
        self.recorded.lock().distributions.push(RecordedDistribution {
            name: name.to_string(),
            centroids: centroids.to_vec(),
            granularities: granularities.clone(),
            timestamp,
            source: source.to_string(),
            tags: tags.clone(),
        });
        Ok(())
    }

    fn start(&self) {
        self.started.store(true, Ordering::Release);
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}
