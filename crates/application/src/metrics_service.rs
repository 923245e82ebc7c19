use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use kube_ns_gc_core::AppResult;
use kube_ns_gc_domain::{CleanupPolicy, is_eligible};

use crate::cleanup_ports::ClusterClient;

/// Point-in-time view of the namespaces the collector can see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceMetricsSnapshot {
    /// Namespaces currently listed by the cluster.
    pub total_namespaces: usize,
    /// Namespaces a cycle started now would tear down.
    pub old_namespaces: usize,
    /// Size of the configured excluded-name set.
    pub excluded_namespaces: usize,
    /// Interval between cleanup cycles.
    pub cleanup_interval: Duration,
    /// Age after which a namespace becomes eligible.
    pub namespace_max_age: Duration,
}

/// Read-only namespace metrics computed on demand.
#[derive(Clone)]
pub struct MetricsService {
    cluster: Arc<dyn ClusterClient>,
    policy: CleanupPolicy,
    cleanup_interval: Duration,
}

impl MetricsService {
    /// Creates a metrics service.
    #[must_use]
    pub fn new(
        cluster: Arc<dyn ClusterClient>,
        policy: CleanupPolicy,
        cleanup_interval: Duration,
    ) -> Self {
        Self {
            cluster,
            policy,
            cleanup_interval,
        }
    }

    /// Lists namespaces and counts those eligible at `now`.
    pub async fn snapshot(&self, now: DateTime<Utc>) -> AppResult<NamespaceMetricsSnapshot> {
        let namespaces = self
            .cluster
            .list_namespaces()
            .await
            .map_err(|error| error.context("failed to list namespaces"))?;

        let old_namespaces = namespaces
            .iter()
            .filter(|namespace| is_eligible(namespace, &self.policy, now))
            .count();

        Ok(NamespaceMetricsSnapshot {
            total_namespaces: namespaces.len(),
            old_namespaces,
            excluded_namespaces: self.policy.excluded_names().len(),
            cleanup_interval: self.cleanup_interval,
            namespace_max_age: self.policy.max_age(),
        })
    }
}
