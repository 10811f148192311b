//! Time-windowed histogram
//!
//! Values are bucketed into fixed wall-clock windows per [`Granularity`].
//! A window becomes reportable once the clock moves past its end; at that
//! point its values are compacted into centroids and queued as a
//! [`Distribution`] until the reporter drains it.
//!
//! Windows are only opened by an update, so a granularity that saw no
//! values for a whole window yields nothing for it.

use crate::digest;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Default centroid bound per closed window
pub const DEFAULT_COMPRESSION: usize = 32;

/// Default number of closed windows kept per granularity
pub const DEFAULT_MAX_BINS: usize = 10;

/// Open windows are compacted once they hold this many times the bound
const BUFFER_FACTOR: usize = 8;

/// Wall-clock source for window boundaries
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Width of a histogram window
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Granularity {
    /// One-minute windows
    Minute,
    /// One-hour windows
    Hour,
    /// One-day windows
    Day,
}

impl Granularity {
    /// All granularities, narrowest first
    pub const ALL: [Granularity; 3] = [Self::Minute, Self::Hour, Self::Day];

    /// Window width in milliseconds
    pub const fn window_millis(self) -> i64 {
        match self {
            Self::Minute => 60_000,
            Self::Hour => 3_600_000,
            Self::Day => 86_400_000,
        }
    }

    /// Lowercase name, also used as the tag value
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
        }
    }

    /// Marker used by distribution wire formats (`!M`, `!H`, `!D`)
    pub const fn wire_prefix(self) -> &'static str {
        match self {
            Self::Minute => "!M",
            Self::Hour => "!H",
            Self::Day => "!D",
        }
    }

    /// Start of the window containing `at`
    pub fn window_start(self, at: DateTime<Utc>) -> DateTime<Utc> {
        let millis = at.timestamp_millis();
        let start = millis - millis.rem_euclid(self.window_millis());
        DateTime::from_timestamp_millis(start).unwrap_or(at)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value and the number of observations it summarizes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    /// Mean of the summarized observations
    pub value: f64,
    /// Number of summarized observations
    pub count: u64,
}

impl Centroid {
    /// Create a centroid
    pub const fn new(value: f64, count: u64) -> Self {
        Self { value, count }
    }

    /// Weighted mean of two centroids
    pub fn merge(self, other: Centroid) -> Centroid {
        let count = self.count + other.count;
        if count == 0 {
            return Centroid::new(self.value, 0);
        }
        let value = (self.value * self.count as f64 + other.value * other.count as f64)
            / count as f64;
        Centroid::new(value, count)
    }
}

/// Centroids of one closed window
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    /// Width of the window
    pub granularity: Granularity,
    /// Start of the window
    pub timestamp: DateTime<Utc>,
    /// Compacted observations
    pub centroids: Vec<Centroid>,
}

impl Distribution {
    /// Total observations in the window
    pub fn count(&self) -> u64 {
        self.centroids.iter().map(|c| c.count).sum()
    }
}

#[derive(Debug)]
struct Bin {
    start: DateTime<Utc>,
    centroids: Vec<Centroid>,
}

impl Bin {
    fn add(&mut self, value: f64, compression: usize) {
        self.centroids.push(Centroid::new(value, 1));
        if self.centroids.len() > compression * BUFFER_FACTOR {
            let centroids = std::mem::take(&mut self.centroids);
            self.centroids = digest::compress(centroids, compression);
        }
    }
}

#[derive(Debug)]
struct Windows {
    granularity: Granularity,
    current: Option<Bin>,
    closed: VecDeque<Distribution>,
}

impl Windows {
    fn new(granularity: Granularity) -> Self {
        Self {
            granularity,
            current: None,
            closed: VecDeque::new(),
        }
    }

    /// Close the open window if `now` lies past it
    fn rotate(&mut self, now: DateTime<Utc>, compression: usize, max_bins: usize) {
        let start = self.granularity.window_start(now);
        let Some(bin) = self.current.take_if(|bin| bin.start < start) else {
            return;
        };

        self.closed.push_back(Distribution {
            granularity: self.granularity,
            timestamp: bin.start,
            centroids: digest::compress(bin.centroids, compression),
        });
        while self.closed.len() > max_bins {
            self.closed.pop_front();
        }
    }

    fn record(&mut self, now: DateTime<Utc>, value: f64, compression: usize) {
        let start = self.granularity.window_start(now);
        self.current
            .get_or_insert_with(|| Bin {
                start,
                centroids: Vec::new(),
            })
            .add(value, compression);
    }
}

/// Histogram reporting per-window distributions
pub struct WindowedHistogram {
    compression: usize,
    max_bins: usize,
    clock: Clock,
    count: AtomicU64,
    windows: Mutex<Vec<Windows>>,
}

impl WindowedHistogram {
    /// Create a histogram with a single granularity and default bounds
    pub fn new(granularity: Granularity) -> Self {
        Self::builder().granularity(granularity).build()
    }

    /// Create a builder
    pub fn builder() -> WindowedHistogramBuilder {
        WindowedHistogramBuilder::new()
    }

    /// Record a value in the open window of every granularity
    pub fn update(&self, value: f64) {
        let now = (self.clock)();
        let mut windows = self.windows.lock();
        for window in windows.iter_mut() {
            window.rotate(now, self.compression, self.max_bins);
            window.record(now, value, self.compression);
        }
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Configured granularities, narrowest first
    pub fn granularities(&self) -> Vec<Granularity> {
        self.windows.lock().iter().map(|w| w.granularity).collect()
    }

    /// Total number of recorded values
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Close windows that ended and drain every closed window
    ///
    /// Open windows stay in place; they are returned by a later call once
    /// the clock passes their end.
    pub fn take_distributions(&self) -> Vec<Distribution> {
        let now = (self.clock)();
        let mut windows = self.windows.lock();
        let mut out = Vec::new();
        for window in windows.iter_mut() {
            window.rotate(now, self.compression, self.max_bins);
            out.extend(window.closed.drain(..));
        }
        out
    }
}

impl fmt::Debug for WindowedHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowedHistogram")
            .field("granularities", &self.granularities())
            .field("compression", &self.compression)
            .field("max_bins", &self.max_bins)
            .field("count", &self.count())
            .finish()
    }
}

impl Default for WindowedHistogram {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`WindowedHistogram`]
pub struct WindowedHistogramBuilder {
    granularities: Vec<Granularity>,
    compression: usize,
    max_bins: usize,
    clock: Option<Clock>,
}

impl WindowedHistogramBuilder {
    /// Create a builder with default bounds and no granularity
    pub fn new() -> Self {
        Self {
            granularities: Vec::new(),
            compression: DEFAULT_COMPRESSION,
            max_bins: DEFAULT_MAX_BINS,
            clock: None,
        }
    }

    /// Add a granularity (defaults to minute when none is added)
    pub fn granularity(mut self, granularity: Granularity) -> Self {
        self.granularities.push(granularity);
        self
    }

    /// Add several granularities
    pub fn granularities(mut self, granularities: impl IntoIterator<Item = Granularity>) -> Self {
        self.granularities.extend(granularities);
        self
    }

    /// Maximum centroids per closed window
    pub fn compression(mut self, compression: usize) -> Self {
        self.compression = compression.max(1);
        self
    }

    /// Maximum closed windows kept per granularity before the oldest drops
    pub fn max_bins(mut self, max_bins: usize) -> Self {
        self.max_bins = max_bins.max(1);
        self
    }

    /// Override the wall clock
    pub fn clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Build the histogram
    pub fn build(mut self) -> WindowedHistogram {
        if self.granularities.is_empty() {
            self.granularities.push(Granularity::Minute);
        }
        self.granularities.sort_unstable();
        self.granularities.dedup();

        WindowedHistogram {
            compression: self.compression,
            max_bins: self.max_bins,
            clock: self.clock.unwrap_or_else(|| Arc::new(Utc::now)),
            count: AtomicU64::new(0),
            windows: Mutex::new(self.granularities.into_iter().map(Windows::new).collect()),
        }
    }
}

impl Default for WindowedHistogramBuilder {
    fn default() -> Self {
        Self::new()
    }
}
