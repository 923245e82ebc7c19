use kube_ns_gc_application::NamespaceMetricsSnapshot;
use serde::Serialize;

/// Liveness payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Namespace metrics payload. Durations are humantime strings.
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub total_namespaces: usize,
    pub old_namespaces: usize,
    pub excluded_namespaces: usize,
    pub cleanup_interval: String,
    pub namespace_max_age: String,
}

impl From<NamespaceMetricsSnapshot> for MetricsResponse {
    fn from(value: NamespaceMetricsSnapshot) -> Self {
        Self {
            total_namespaces: value.total_namespaces,
            old_namespaces: value.old_namespaces,
            excluded_namespaces: value.excluded_namespaces,
            cleanup_interval: humantime_serde::re::humantime::format_duration(
                value.cleanup_interval,
            )
            .to_string(),
            namespace_max_age: humantime_serde::re::humantime::format_duration(
                value.namespace_max_age,
            )
            .to_string(),
        }
    }
}
