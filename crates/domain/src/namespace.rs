use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use kube_ns_gc_core::{AppResult, NonEmptyString};

/// Read-only view of one cluster namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDescriptor {
    name: NonEmptyString,
    created_at: DateTime<Utc>,
    labels: BTreeMap<String, String>,
}

impl NamespaceDescriptor {
    /// Creates a validated namespace descriptor.
    pub fn new(
        name: impl Into<String>,
        created_at: DateTime<Utc>,
        labels: BTreeMap<String, String>,
    ) -> AppResult<Self> {
        Ok(Self {
            name: NonEmptyString::new(name)?,
            created_at,
            labels,
        })
    }

    /// Returns the namespace name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the creation timestamp reported by the cluster.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the namespace labels.
    #[must_use]
    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    /// Returns true when `key` is present, whatever its value.
    #[must_use]
    pub fn has_label(&self, key: &str) -> bool {
        self.labels.contains_key(key)
    }

    /// Returns the namespace age at `now`. Negative when created in the future.
    #[must_use]
    pub fn age_at(&self, now: DateTime<Utc>) -> TimeDelta {
        now.signed_duration_since(self.created_at)
    }
}
