//! Histogram samples
//!
//! A sample decides which observed values a histogram keeps. Two reservoir
//! strategies are provided:
//!
//! - [`UniformSample`]: every value ever observed has the same probability of
//!   being in the reservoir (Vitter's algorithm R).
//! - [`ExpDecaySample`]: forward-decaying priority reservoir that favours
//!   recent values, rescaling priorities every hour to keep them finite.

use rand::Rng;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// How often an [`ExpDecaySample`] rescales its priorities
const RESCALE_THRESHOLD: Duration = Duration::from_secs(60 * 60);

/// Reservoir strategy used by a [`Histogram`](crate::Histogram)
pub trait Sample: Send {
    /// Record a value
    fn update(&mut self, value: i64);

    /// Number of values recorded since creation or the last clear
    fn count(&self) -> u64;

    /// Number of values currently held in the reservoir
    fn size(&self) -> usize;

    /// Copy of the values currently held in the reservoir
    fn values(&self) -> Vec<i64>;

    /// Drop all values and reset the count
    fn clear(&mut self);

    /// Point-in-time statistics over the reservoir
    fn snapshot(&self) -> SampleSnapshot {
        SampleSnapshot::new(self.count(), self.values())
    }
}

/// Uniform reservoir sample
#[derive(Debug, Clone)]
pub struct UniformSample {
    reservoir_size: usize,
    count: u64,
    values: Vec<i64>,
}

impl UniformSample {
    /// Create a sample that keeps at most `reservoir_size` values
    pub fn new(reservoir_size: usize) -> Self {
        Self {
            reservoir_size,
            count: 0,
            values: Vec::with_capacity(reservoir_size),
        }
    }
}

impl Sample for UniformSample {
    fn update(&mut self, value: i64) {
        self.count += 1;
        if self.values.len() < self.reservoir_size {
            self.values.push(value);
            return;
        }

        let slot = rand::rng().random_range(0..self.count);
        if let Some(existing) = usize::try_from(slot)
            .ok()
            .and_then(|slot| self.values.get_mut(slot))
        {
            *existing = value;
        }
    }

    fn count(&self) -> u64 {
        self.count
    }

    fn size(&self) -> usize {
        self.values.len()
    }

    fn values(&self) -> Vec<i64> {
        self.values.clone()
    }

    fn clear(&mut self) {
        self.count = 0;
        self.values.clear();
    }
}

/// Reservoir priority, ordered with `f64::total_cmp`
#[derive(Debug, Clone, Copy)]
struct Priority(f64);

impl PartialEq for Priority {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Priority {}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Exponentially decaying reservoir sample
#[derive(Debug, Clone)]
pub struct ExpDecaySample {
    alpha: f64,
    reservoir_size: usize,
    count: u64,
    t0: Instant,
    t1: Instant,
    values: BTreeMap<Priority, i64>,
}

impl ExpDecaySample {
    /// Create a sample keeping `reservoir_size` values, decaying with `alpha`
    ///
    /// `1028` values with an alpha of `0.015` approximates the last five
    /// minutes of data.
    pub fn new(reservoir_size: usize, alpha: f64) -> Self {
        let now = Instant::now();
        Self {
            alpha,
            reservoir_size,
            count: 0,
            t0: now,
            t1: now + RESCALE_THRESHOLD,
            values: BTreeMap::new(),
        }
    }

    /// Record a value observed at `t`
    pub fn update_at(&mut self, t: Instant, value: i64) {
        self.count += 1;

        // random() is in [0, 1); flip it so the divisor is never zero
        let u = 1.0 - rand::rng().random::<f64>();
        let elapsed = t.saturating_duration_since(self.t0).as_secs_f64();
        let priority = (self.alpha * elapsed).exp() / u;

        self.values.insert(Priority(priority), value);
        if self.values.len() > self.reservoir_size {
            self.values.pop_first();
        }

        if t > self.t1 {
            self.rescale(t);
        }
    }

    fn rescale(&mut self, t: Instant) {
        let previous = self.t0;
        self.t0 = t;
        self.t1 = t + RESCALE_THRESHOLD;

        let factor = (-self.alpha * t.saturating_duration_since(previous).as_secs_f64()).exp();
        self.values = std::mem::take(&mut self.values)
            .into_iter()
            .map(|(priority, value)| (Priority(priority.0 * factor), value))
            .collect();
    }
}

impl Sample for ExpDecaySample {
    fn update(&mut self, value: i64) {
        self.update_at(Instant::now(), value);
    }

    fn count(&self) -> u64 {
        self.count
    }

    fn size(&self) -> usize {
        self.values.len()
    }

    fn values(&self) -> Vec<i64> {
        self.values.values().copied().collect()
    }

    fn clear(&mut self) {
        let now = Instant::now();
        self.count = 0;
        self.t0 = now;
        self.t1 = now + RESCALE_THRESHOLD;
        self.values.clear();
    }
}

/// Statistics over a copy of a sample's reservoir
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSnapshot {
    count: u64,
    sorted: Vec<i64>,
}

impl SampleSnapshot {
    /// Build a snapshot from a total count and the reservoir contents
    pub fn new(count: u64, mut values: Vec<i64>) -> Self {
        values.sort_unstable();
        Self {
            count,
            sorted: values,
        }
    }

    /// Total number of recorded values, including those evicted
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Number of values the statistics are computed over
    pub fn size(&self) -> usize {
        self.sorted.len()
    }

    /// Smallest value, 0 when empty
    pub fn min(&self) -> i64 {
        self.sorted.first().copied().unwrap_or(0)
    }

    /// Largest value, 0 when empty
    pub fn max(&self) -> i64 {
        self.sorted.last().copied().unwrap_or(0)
    }

    /// Arithmetic mean, 0 when empty
    pub fn mean(&self) -> f64 {
        if self.sorted.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.sorted.iter().map(|&v| v as f64).sum();
        sum / self.sorted.len() as f64
    }

    /// Population variance, 0 when empty
    pub fn variance(&self) -> f64 {
        if self.sorted.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let sum: f64 = self
            .sorted
            .iter()
            .map(|&v| {
                let diff = v as f64 - mean;
                diff * diff
            })
            .sum();
        sum / self.sorted.len() as f64
    }

    /// Population standard deviation, 0 when empty
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Value at quantile `p` (0.0..=1.0), interpolating between ranks
    ///
    /// Quantiles outside the range clamp to the extremes; NaN yields 0.
    pub fn percentile(&self, p: f64) -> f64 {
        let n = self.sorted.len();
        if n == 0 || p.is_nan() {
            return 0.0;
        }

        let pos = p * (n as f64 + 1.0);
        if pos < 1.0 {
            return self.sorted[0] as f64;
        }
        if pos >= n as f64 {
            return self.sorted[n - 1] as f64;
        }

        let rank = pos as usize;
        let lower = self.sorted[rank - 1] as f64;
        let upper = self.sorted[rank] as f64;
        lower + (pos - pos.floor()) * (upper - lower)
    }

    /// Values at each of the quantiles in `ps`
    pub fn percentiles(&self, ps: &[f64]) -> Vec<f64> {
        ps.iter().map(|&p| self.percentile(p)).collect()
    }
}
