//! The closed set of reportable metric kinds

use crate::{Counter, Gauge, GaugeFloat64, Histogram, WindowedHistogram};
use std::sync::Arc;

/// A registered metric
///
/// Each variant holds a shared handle; cloning a `Metric` clones the handle,
/// not the underlying values.
#[derive(Debug, Clone)]
pub enum Metric {
    /// Monotonic or signed counter
    Counter(Arc<Counter>),
    /// Integer gauge
    Gauge(Arc<Gauge>),
    /// Floating point gauge
    GaugeFloat64(Arc<GaugeFloat64>),
    /// Sample-based histogram
    Histogram(Arc<Histogram>),
    /// Time-windowed histogram
    WindowedHistogram(Arc<WindowedHistogram>),
}

impl Metric {
    /// Short kind name for logs
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Counter(_) => "counter",
            Self::Gauge(_) => "gauge",
            Self::GaugeFloat64(_) => "gauge_float64",
            Self::Histogram(_) => "histogram",
            Self::WindowedHistogram(_) => "windowed_histogram",
        }
    }

    /// The counter handle, if this is a counter
    pub fn as_counter(&self) -> Option<&Arc<Counter>> {
        match self {
            Self::Counter(counter) => Some(counter),
            _ => None,
        }
    }

    /// Whether two metrics share the same underlying handle
    pub fn same_handle(&self, other: &Metric) -> bool {
        match (self, other) {
            (Self::Counter(a), Self::Counter(b)) => Arc::ptr_eq(a, b),
            (Self::Gauge(a), Self::Gauge(b)) => Arc::ptr_eq(a, b),
            (Self::GaugeFloat64(a), Self::GaugeFloat64(b)) => Arc::ptr_eq(a, b),
            (Self::Histogram(a), Self::Histogram(b)) => Arc::ptr_eq(a, b),
            (Self::WindowedHistogram(a), Self::WindowedHistogram(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

macro_rules! impl_from {
    ($($kind:ident),* $(,)?) => {
        $(
            impl From<Arc<$kind>> for Metric {
                fn from(metric: Arc<$kind>) -> Self {
                    Self::$kind(metric)
                }
            }

            impl From<$kind> for Metric {
                fn from(metric: $kind) -> Self {
                    Self::$kind(Arc::new(metric))
                }
            }
        )*
    };
}

impl_from!(Counter, Gauge, GaugeFloat64, Histogram, WindowedHistogram);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UniformSample;

    #[test]
    fn test_from_conversions() {
        assert_eq!(Metric::from(Counter::new()).kind(), "counter");
        assert_eq!(Metric::from(Gauge::new()).kind(), "gauge");
        assert_eq!(Metric::from(GaugeFloat64::new()).kind(), "gauge_float64");
        assert_eq!(
            Metric::from(Histogram::new(UniformSample::new(10))).kind(),
            "histogram"
        );
        assert_eq!(
            Metric::from(WindowedHistogram::default()).kind(),
            "windowed_histogram"
        );
    }

    #[test]
    fn test_same_handle() {
        let counter = Arc::new(Counter::new());
        let a = Metric::from(Arc::clone(&counter));
        let b = Metric::from(counter);
        let c = Metric::from(Counter::new());
        assert!(a.same_handle(&b));
        assert!(!a.same_handle(&c));
        assert!(!a.same_handle(&Metric::from(Gauge::new())));
    }

    #[test]
    fn test_as_counter() {
        assert!(Metric::from(Counter::new()).as_counter().is_some());
        assert!(Metric::from(Gauge::new()).as_counter().is_none());
    }
}
