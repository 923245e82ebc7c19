use kube_ns_gc_application::MetricsService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub metrics_service: MetricsService,
}
