//! Sample-based histogram
//!
//! Wraps a [`Sample`] behind a mutex so any thread can record values while
//! the reporter takes snapshots. Snapshots never reset the sample; decay is
//! entirely up to the chosen reservoir strategy.

use crate::sample::{Sample, SampleSnapshot};
use parking_lot::Mutex;
use std::fmt;

/// Point-in-time histogram statistics
pub type HistogramSnapshot = SampleSnapshot;

/// Histogram over a reservoir sample
pub struct Histogram {
    sample: Mutex<Box<dyn Sample>>,
}

impl Histogram {
    /// Create a histogram backed by `sample`
    pub fn new(sample: impl Sample + 'static) -> Self {
        Self {
            sample: Mutex::new(Box::new(sample)),
        }
    }

    /// Record a value
    pub fn update(&self, value: i64) {
        self.sample.lock().update(value);
    }

    /// Total number of recorded values
    pub fn count(&self) -> u64 {
        self.sample.lock().count()
    }

    /// Drop all recorded values
    pub fn clear(&self) {
        self.sample.lock().clear();
    }

    /// Copy the current reservoir and compute statistics over it
    pub fn snapshot(&self) -> HistogramSnapshot {
        self.sample.lock().snapshot()
    }
}

impl fmt::Debug for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sample = self.sample.lock();
        f.debug_struct("Histogram")
            .field("count", &sample.count())
            .field("size", &sample.size())
            .finish()
    }
}
