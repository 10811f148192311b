//! Gauges
//!
//! A gauge holds the last value written to it. Integer and floating point
//! variants are both lock-free; the float gauge stores its bits.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Integer gauge
#[derive(Debug, Default)]
pub struct Gauge(AtomicI64);

impl Gauge {
    /// Create a new gauge initialized to 0
    pub const fn new() -> Self {
        Self(AtomicI64::new(0))
    }

    /// Replace the current value
    #[inline]
    pub fn update(&self, val: i64) {
        self.0.store(val, Ordering::Relaxed);
    }

    /// Get the current value
    #[inline]
    pub fn value(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Floating point gauge
#[derive(Debug)]
pub struct GaugeFloat64(AtomicU64);

impl GaugeFloat64 {
    /// Create a new gauge initialized to 0.0
    pub fn new() -> Self {
        Self(AtomicU64::new(0f64.to_bits()))
    }

    /// Replace the current value
    #[inline]
    pub fn update(&self, val: f64) {
        self.0.store(val.to_bits(), Ordering::Relaxed);
    }

    /// Get the current value
    #[inline]
    pub fn value(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }
}

impl Default for GaugeFloat64 {
    fn default() -> Self {
        Self::new()
    }
}
