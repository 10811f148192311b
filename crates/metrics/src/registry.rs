//! Concurrent metric registry
//!
//! A name → [`Metric`] map safe to use from any thread. Registration keeps
//! the first metric written under a name; later writes report a duplicate.

use crate::{Metric, MetricsError, Result};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Name → metric map
#[derive(Debug, Default)]
pub struct Registry {
    metrics: DashMap<String, Metric>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `metric` under `name`
    ///
    /// Returns [`MetricsError::Duplicate`] and keeps the existing metric if
    /// the name is taken.
    pub fn register(&self, name: impl Into<String>, metric: impl Into<Metric>) -> Result<()> {
        match self.metrics.entry(name.into()) {
            Entry::Occupied(entry) => Err(MetricsError::Duplicate(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(metric.into());
                Ok(())
            }
        }
    }

    /// Metric registered under `name`
    pub fn get(&self, name: &str) -> Option<Metric> {
        self.metrics.get(name).map(|entry| entry.value().clone())
    }

    /// Existing metric under `name`, or register the one built by `init`
    pub fn get_or_register<F, M>(&self, name: impl Into<String>, init: F) -> Metric
    where
        F: FnOnce() -> M,
        M: Into<Metric>,
    {
        self.metrics
            .entry(name.into())
            .or_insert_with(|| init().into())
            .value()
            .clone()
    }

    /// Remove the metric under `name`, returning it
    pub fn unregister(&self, name: &str) -> Option<Metric> {
        self.metrics.remove(name).map(|(_, metric)| metric)
    }

    /// Remove every metric
    pub fn unregister_all(&self) {
        self.metrics.clear();
    }

    /// Names of all registered metrics
    pub fn names(&self) -> Vec<String> {
        self.metrics.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Point-in-time copy of all (name, metric) pairs
    pub fn snapshot(&self) -> Vec<(String, Metric)> {
        self.metrics
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Number of registered metrics
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Whether no metric is registered
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
