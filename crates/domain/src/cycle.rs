use std::time::Duration;

/// Outcome of one cleanup cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupCycleResult {
    /// Namespaces returned by the cluster listing.
    pub total: usize,
    /// Namespaces whose deletion was confirmed.
    pub cleaned: usize,
    /// Eligible namespaces whose teardown failed.
    pub failed: usize,
    /// Wall-clock duration of the cycle.
    pub duration: Duration,
}
