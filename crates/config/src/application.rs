//! Application identity
//!
//! Identity tags attached to every emission so the backend can group
//! metrics by application and service.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Tag value used when an optional identity field is unset
pub const NONE_TAG_VALUE: &str = "none";

/// Application identity configuration
///
/// # Example
///
/// ```toml
/// [application]
/// application = "checkout"
/// service = "payments"
/// shard = "primary"
///
/// [application.custom_tags]
/// team = "billing"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Application name
    pub application: String,

    /// Service name within the application
    pub service: String,

    /// Cluster the service runs in
    pub cluster: Option<String>,

    /// Shard the service instance belongs to
    pub shard: Option<String>,

    /// Extra tags attached to every emission
    pub custom_tags: BTreeMap<String, String>,
}

impl ApplicationConfig {
    /// Create an identity from an application/service pair
    pub fn new(application: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            application: application.into(),
            service: service.into(),
            ..Default::default()
        }
    }

    /// Set the cluster
    pub fn with_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = Some(cluster.into());
        self
    }

    /// Set the shard
    pub fn with_shard(mut self, shard: impl Into<String>) -> Self {
        self.shard = Some(shard.into());
        self
    }

    /// Add a custom tag
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_tags.insert(key.into(), value.into());
        self
    }

    /// Implicit tag set for every emission
    ///
    /// Custom tags are applied first so the identity keys always win.
    pub fn point_tags(&self) -> BTreeMap<String, String> {
        let mut tags = self.custom_tags.clone();
        tags.insert("application".into(), self.application.clone());
        tags.insert("service".into(), self.service.clone());
        tags.insert(
            "cluster".into(),
            self.cluster.clone().unwrap_or_else(|| NONE_TAG_VALUE.into()),
        );
        tags.insert(
            "shard".into(),
            self.shard.clone().unwrap_or_else(|| NONE_TAG_VALUE.into()),
        );
        tags
    }
}
