//! Tagged registry facade
//!
//! The underlying [`Registry`] has no notion of tags. This facade keeps a
//! per-name overlay next to it holding the tag set, the delta flag decided
//! at registration and, for delta counters, the counter value at that time.
//!
//! Metrics registered straight into the underlying registry are still
//! visible through the facade with an empty tag set; only for those is the
//! delta flag derived from the name.

use crate::delta::is_delta_counter;
use crate::{Metric, MetricsError, Registry};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Tag key → tag value
pub type Tags = BTreeMap<String, String>;

#[derive(Debug, Clone)]
struct Overlay {
    tags: Tags,
    delta: bool,
    delta_origin: Option<i64>,
}

impl Overlay {
    fn new(tags: Tags, delta_name: bool, metric: &Metric) -> Self {
        let delta = delta_name && metric.as_counter().is_some();
        Self {
            tags,
            delta,
            delta_origin: delta_origin(delta, metric),
        }
    }
}

/// A metric together with everything the reporter needs to emit it
#[derive(Debug, Clone)]
pub struct RegisteredMetric {
    /// The metric handle
    pub metric: Metric,
    /// Tags registered with the metric (empty when none)
    pub tags: Tags,
    /// Whether the metric is reported as a delta counter
    pub delta: bool,
    /// Counter value when the delta counter was registered
    pub delta_origin: i64,
}

/// Registry facade with tag overlays
#[derive(Debug, Default)]
pub struct MetricRegistry {
    registry: Arc<Registry>,
    overlays: DashMap<String, Overlay>,
}

impl MetricRegistry {
    /// Create a facade over a fresh registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a facade over an existing registry
    pub fn with_registry(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            overlays: DashMap::new(),
        }
    }

    /// The underlying registry
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Register `metric` under `name` with `tags`
    ///
    /// If the name is already taken the existing metric is kept, but the tag
    /// set is replaced; the last registration decides the tags.
    pub fn register(&self, name: impl Into<String>, metric: impl Into<Metric>, tags: Tags) {
        let name = name.into();
        let metric = metric.into();
        let delta_name = is_delta_counter(&name);

        let previous = self
            .overlays
            .insert(name.clone(), Overlay::new(tags, delta_name, &metric));

        if let Err(MetricsError::Duplicate(_)) = self.registry.register(name.clone(), metric) {
            debug!(metric = %name, "metric already registered, keeping existing metric");

            let Some(existing) = self.registry.get(&name) else {
                return;
            };
            let delta = delta_name && existing.as_counter().is_some();
            if let Some(mut overlay) = self.overlays.get_mut(&name) {
                overlay.delta = delta;
                overlay.delta_origin = previous
                    .and_then(|p| p.delta_origin)
                    .or_else(|| delta_origin(delta, &existing));
            }
        }
    }

    /// Metric registered under `name`
    pub fn get(&self, name: &str) -> Option<Metric> {
        self.registry.get(name)
    }

    /// Existing metric under `name`, or register the one built by `init`
    pub fn get_or_register<F, M>(&self, name: impl Into<String>, tags: Tags, init: F) -> Metric
    where
        F: FnOnce() -> M,
        M: Into<Metric>,
    {
        let name = name.into();
        if let Some(metric) = self.registry.get(&name) {
            return metric;
        }

        let metric = init().into();
        self.register(name.clone(), metric.clone(), tags);
        self.registry.get(&name).unwrap_or(metric)
    }

    /// Remove the metric and its tags
    ///
    /// The metric leaves the registry before its overlay, so a concurrent
    /// pass never sees it stripped of its tags or delta origin.
    pub fn remove(&self, name: &str) -> Option<Metric> {
        let metric = self.registry.unregister(name);
        self.overlays.remove(name);
        metric
    }

    /// Remove every metric and every tag overlay
    pub fn remove_all(&self) {
        self.registry.unregister_all();
        self.overlays.clear();
    }

    /// Tags registered for `name`, empty when none were registered
    pub fn tags_for(&self, name: &str) -> Tags {
        self.overlays
            .get(name)
            .map(|overlay| overlay.tags.clone())
            .unwrap_or_default()
    }

    /// Metric, tags and delta flag for `name`
    ///
    /// The overlay is read before the registry; paired with the removal
    /// order in [`remove`](Self::remove) this never yields a removed
    /// metric without its tags.
    pub fn entry(&self, name: &str) -> Option<RegisteredMetric> {
        let overlay = self.overlays.get(name).map(|overlay| overlay.value().clone());
        let metric = self.registry.get(name)?;
        let is_counter = metric.as_counter().is_some();

        let entry = match overlay {
            Some(overlay) => RegisteredMetric {
                delta: overlay.delta && is_counter,
                delta_origin: overlay.delta_origin.unwrap_or(0),
                tags: overlay.tags,
                metric,
            },
            None => RegisteredMetric {
                delta: is_counter && is_delta_counter(name),
                delta_origin: 0,
                tags: Tags::new(),
                metric,
            },
        };
        Some(entry)
    }

    /// Names of all registered metrics
    pub fn names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Number of registered metrics
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether no metric is registered
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

fn delta_origin(delta: bool, metric: &Metric) -> Option<i64> {
    if !delta {
        return None;
    }
    metric.as_counter().map(|counter| counter.count())
}
