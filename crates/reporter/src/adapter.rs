//! Metric adapters.
//!
//! Convert one registered metric into the emissions the sender receives:
//!
//! | kind               | emissions                                        |
//! |--------------------|--------------------------------------------------|
//! | counter            | point `<name>.count`                             |
//! | delta counter      | delta `<name>` (marker stripped)                 |
//! | gauge / float      | point `<name>.value`                             |
//! | histogram          | ten points, one per statistic                    |
//! | windowed histogram | one distribution per closed window               |

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tally_metrics::{
    Counter, Distribution, HistogramSnapshot, Metric, RegisteredMetric, strip_delta_marker,
};

use crate::naming::Naming;

/// Quantiles reported for sample-based histograms, with their name segment.
pub const HISTOGRAM_PERCENTILES: [(&str, f64); 5] = [
    ("p50", 0.5),
    ("p75", 0.75),
    ("p95", 0.95),
    ("p99", 0.99),
    ("p999", 0.999),
];

/// One call the reporter makes on the sender.
#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    /// Absolute value
    Point { name: String, value: f64 },
    /// Increase since the previous report
    Delta { name: String, value: f64 },
    /// Closed histogram window
    Distribution {
        name: String,
        distribution: Distribution,
    },
}

impl Emission {
    /// Wire name of the emission
    pub fn name(&self) -> &str {
        match self {
            Self::Point { name, .. } | Self::Delta { name, .. } => name,
            Self::Distribution { name, .. } => name,
        }
    }

    /// Short kind name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Point { .. } => "point",
            Self::Delta { .. } => "delta",
            Self::Distribution { .. } => "distribution",
        }
    }
}

/// Last reported value of every delta counter.
///
/// Keyed by registered name and tied to the counter handle, so a name
/// re-registered with a new counter starts from that counter's origin.
#[derive(Debug, Default)]
pub struct DeltaBaselines {
    last: HashMap<String, (Arc<Counter>, i64)>,
}

impl DeltaBaselines {
    /// Create an empty baseline table
    pub fn new() -> Self {
        Self::default()
    }

    /// Difference since the previous call, moving the baseline to the current value
    fn advance(&mut self, name: &str, counter: &Arc<Counter>, origin: i64) -> i64 {
        let current = counter.count();
        let previous = match self.last.get(name) {
            Some((seen, value)) if Arc::ptr_eq(seen, counter) => *value,
            _ => origin,
        };
        self.last
            .insert(name.to_string(), (Arc::clone(counter), current));
        current.wrapping_sub(previous)
    }

    /// Forget baselines of names no longer registered
    pub fn retain_names(&mut self, names: &[String]) {
        let live: HashSet<&str> = names.iter().map(String::as_str).collect();
        self.last.retain(|name, _| live.contains(name.as_str()));
    }

    /// Number of tracked delta counters
    pub fn len(&self) -> usize {
        self.last.len()
    }

    /// Whether no delta counter is tracked
    pub fn is_empty(&self) -> bool {
        self.last.is_empty()
    }
}

/// Emissions for the metric registered under `name`.
pub fn emissions(
    name: &str,
    entry: &RegisteredMetric,
    naming: &Naming,
    baselines: &mut DeltaBaselines,
) -> Vec<Emission> {
    match &entry.metric {
        Metric::Counter(counter) if entry.delta => {
            let value = baselines.advance(name, counter, entry.delta_origin);
            vec![Emission::Delta {
                name: naming.prepare_name(strip_delta_marker(name), &[]),
                value: value as f64,
            }]
        }
        Metric::Counter(counter) => vec![Emission::Point {
            name: naming.prepare_name(name, &["count"]),
            value: counter.count() as f64,
        }],
        Metric::Gauge(gauge) => vec![Emission::Point {
            name: naming.prepare_name(name, &["value"]),
            value: gauge.value() as f64,
        }],
        Metric::GaugeFloat64(gauge) => vec![Emission::Point {
            name: naming.prepare_name(name, &["value"]),
            value: gauge.value(),
        }],
        Metric::Histogram(histogram) => histogram_points(name, &histogram.snapshot(), naming),
        Metric::WindowedHistogram(histogram) => {
            let name = naming.prepare_name(name, &[]);
            histogram
                .take_distributions()
                .into_iter()
                .map(|distribution| Emission::Distribution {
                    name: name.clone(),
                    distribution,
                })
                .collect()
        }
    }
}

/// One point per statistic. The statistic is part of the name whether or
/// not suffixes are enabled, otherwise the ten points would collide.
fn histogram_points(name: &str, snapshot: &HistogramSnapshot, naming: &Naming) -> Vec<Emission> {
    let point = |stat: &str, value: f64| Emission::Point {
        name: naming.prepare_name(&format!("{name}.{stat}"), &[]),
        value,
    };

    let mut points = vec![
        point("count", snapshot.count() as f64),
        point("min", snapshot.min() as f64),
        point("max", snapshot.max() as f64),
        point("mean", snapshot.mean()),
        point("stddev", snapshot.std_dev()),
    ];
    points.extend(
        HISTOGRAM_PERCENTILES
            .iter()
            .map(|&(stat, p)| point(stat, snapshot.percentile(p))),
    );
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicI64, Ordering};
    use tally_metrics::{
        Gauge, GaugeFloat64, Granularity, Histogram, MetricRegistry, Tags, UniformSample,
        WindowedHistogram, delta_counter_name,
    };

    fn entry_for(registry: &MetricRegistry, name: &str) -> RegisteredMetric {
        registry.entry(name).unwrap()
    }

    fn names(emissions: &[Emission]) -> Vec<&str> {
        emissions.iter().map(Emission::name).collect()
    }

    #[test]
    fn test_counter_point() {
        let registry = MetricRegistry::new();
        let counter = Arc::new(Counter::new());
        registry.register("requests", Arc::clone(&counter), Tags::new());
        counter.inc(5);

        let out = emissions(
            "requests",
            &entry_for(&registry, "requests"),
            &Naming::new("app", true),
            &mut DeltaBaselines::new(),
        );
        assert_eq!(
            out,
            vec![Emission::Point {
                name: "app.requests.count".into(),
                value: 5.0
            }]
        );
    }

    #[test]
    fn test_gauges() {
        let registry = MetricRegistry::new();
        let gauge = Arc::new(Gauge::new());
        let float = Arc::new(GaugeFloat64::new());
        gauge.update(3);
        float.update(1.5);
        registry.register("g", gauge, Tags::new());
        registry.register("f", float, Tags::new());

        let naming = Naming::new("", true);
        let mut baselines = DeltaBaselines::new();
        assert_eq!(
            emissions("g", &entry_for(&registry, "g"), &naming, &mut baselines),
            vec![Emission::Point {
                name: "g.value".into(),
                value: 3.0
            }]
        );
        assert_eq!(
            emissions("f", &entry_for(&registry, "f"), &naming, &mut baselines),
            vec![Emission::Point {
                name: "f.value".into(),
                value: 1.5
            }]
        );
    }

    #[test]
    fn test_counter_and_gauge_names_do_not_collide() {
        let naming = Naming::new("", true);
        assert_ne!(
            naming.prepare_name("x", &["count"]),
            naming.prepare_name("x", &["value"])
        );
    }

    #[test]
    fn test_delta_counter() {
        let registry = MetricRegistry::new();
        let counter = Arc::new(Counter::new());
        let name = delta_counter_name("foo");
        registry.register(name.clone(), Arc::clone(&counter), Tags::new());

        let naming = Naming::new("prefix", true);
        let mut baselines = DeltaBaselines::new();

        counter.inc(10);
        let out = emissions(&name, &entry_for(&registry, &name), &naming, &mut baselines);
        assert_eq!(
            out,
            vec![Emission::Delta {
                name: "prefix.foo".into(),
                value: 10.0
            }]
        );

        counter.inc(4);
        let out = emissions(&name, &entry_for(&registry, &name), &naming, &mut baselines);
        assert_eq!(
            out,
            vec![Emission::Delta {
                name: "prefix.foo".into(),
                value: 4.0
            }]
        );

        let out = emissions(&name, &entry_for(&registry, &name), &naming, &mut baselines);
        assert_eq!(
            out,
            vec![Emission::Delta {
                name: "prefix.foo".into(),
                value: 0.0
            }]
        );
    }

    #[test]
    fn test_delta_counter_starts_from_registration_value() {
        let registry = MetricRegistry::new();
        let counter = Arc::new(Counter::new());
        counter.inc(100);
        let name = delta_counter_name("foo");
        registry.register(name.clone(), Arc::clone(&counter), Tags::new());
        counter.inc(1);

        let out = emissions(
            &name,
            &entry_for(&registry, &name),
            &Naming::default(),
            &mut DeltaBaselines::new(),
        );
        assert_eq!(
            out,
            vec![Emission::Delta {
                name: "foo".into(),
                value: 1.0
            }]
        );
    }

    #[test]
    fn test_delta_baseline_resets_for_new_counter() {
        let registry = MetricRegistry::new();
        let name = delta_counter_name("foo");
        let mut baselines = DeltaBaselines::new();

        let first = Arc::new(Counter::new());
        registry.register(name.clone(), Arc::clone(&first), Tags::new());
        first.inc(50);
        emissions(&name, &entry_for(&registry, &name), &Naming::default(), &mut baselines);

        registry.remove(&name);
        let second = Arc::new(Counter::new());
        registry.register(name.clone(), Arc::clone(&second), Tags::new());
        second.inc(2);

        let out = emissions(&name, &entry_for(&registry, &name), &Naming::default(), &mut baselines);
        assert_eq!(
            out,
            vec![Emission::Delta {
                name: "foo".into(),
                value: 2.0
            }]
        );
    }

    #[test]
    fn test_retain_names() {
        let registry = MetricRegistry::new();
        let name = delta_counter_name("foo");
        registry.register(name.clone(), Counter::new(), Tags::new());
        let mut baselines = DeltaBaselines::new();
        emissions(&name, &entry_for(&registry, &name), &Naming::default(), &mut baselines);
        assert_eq!(baselines.len(), 1);

        baselines.retain_names(&[]);
        assert!(baselines.is_empty());
    }

    #[test]
    fn test_histogram_points() {
        let registry = MetricRegistry::new();
        let histogram = Arc::new(Histogram::new(UniformSample::new(1028)));
        for i in 1..=100 {
            histogram.update(i);
        }
        registry.register("latency", histogram, Tags::new());

        for add_suffix in [true, false] {
            let out = emissions(
                "latency",
                &entry_for(&registry, "latency"),
                &Naming::new("", add_suffix),
                &mut DeltaBaselines::new(),
            );
            assert_eq!(
                names(&out),
                vec![
                    "latency.count",
                    "latency.min",
                    "latency.max",
                    "latency.mean",
                    "latency.stddev",
                    "latency.p50",
                    "latency.p75",
                    "latency.p95",
                    "latency.p99",
                    "latency.p999",
                ]
            );
        }

        let out = emissions(
            "latency",
            &entry_for(&registry, "latency"),
            &Naming::default(),
            &mut DeltaBaselines::new(),
        );
        assert_eq!(
            out[0],
            Emission::Point {
                name: "latency.count".into(),
                value: 100.0
            }
        );
        assert_eq!(
            out[5],
            Emission::Point {
                name: "latency.p50".into(),
                value: 50.5
            }
        );
    }

    #[test]
    fn test_windowed_histogram_distributions() {
        let now = Arc::new(AtomicI64::new(1_704_067_210_000));
        let clock_now = Arc::clone(&now);
        let histogram = Arc::new(
            WindowedHistogram::builder()
                .granularity(Granularity::Minute)
                .clock(move || {
                    DateTime::<Utc>::from_timestamp_millis(clock_now.load(Ordering::Relaxed))
                        .unwrap_or_default()
                })
                .build(),
        );
        let registry = MetricRegistry::new();
        registry.register("wf.histogram", Arc::clone(&histogram), Tags::new());
        histogram.update(1.0);

        let naming = Naming::new("prefix", true);
        let mut baselines = DeltaBaselines::new();
        let entry = entry_for(&registry, "wf.histogram");
        assert!(emissions("wf.histogram", &entry, &naming, &mut baselines).is_empty());

        now.fetch_add(120_000, Ordering::Relaxed);
        let out = emissions("wf.histogram", &entry, &naming, &mut baselines);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name(), "prefix.wf.histogram");
        assert_eq!(out[0].kind(), "distribution");
    }
}
