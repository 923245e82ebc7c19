use std::sync::Arc;
use std::time::Duration;

use kube_ns_gc_core::{AppError, AppResult};
use kube_ns_gc_domain::CleanupPolicy;
use tokio::sync::watch;
use tracing::warn;

use crate::cleanup_ports::{ClusterClient, ReleaseManager};
use crate::notification_service::NotificationService;

mod confirm;
mod cycle;
mod reap;

/// One release that could not be uninstalled.
#[derive(Debug)]
pub struct ReleaseFailure {
    /// Release name.
    pub release: String,
    /// Uninstall error.
    pub error: AppError,
}

/// Result of uninstalling every release in one namespace.
#[derive(Debug, Default)]
pub struct ReapOutcome {
    /// Number of uninstalls attempted.
    pub attempted: usize,
    /// Releases whose uninstall failed, in attempt order.
    pub failures: Vec<ReleaseFailure>,
}

impl ReapOutcome {
    /// Returns true when every attempted uninstall succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Namespace garbage collection engine.
///
/// Holds the cluster and release-manager handles for the lifetime of the
/// process; each call to [`CleanupService::run_cycle`] performs one full pass.
#[derive(Clone)]
pub struct CleanupService {
    cluster: Arc<dyn ClusterClient>,
    releases: Arc<dyn ReleaseManager>,
    notifications: NotificationService,
    policy: CleanupPolicy,
    shutdown: Option<watch::Receiver<bool>>,
}

impl CleanupService {
    /// Creates a cleanup service.
    #[must_use]
    pub fn new(
        cluster: Arc<dyn ClusterClient>,
        releases: Arc<dyn ReleaseManager>,
        notifications: NotificationService,
        policy: CleanupPolicy,
    ) -> Self {
        Self {
            cluster,
            releases,
            notifications,
            policy,
            shutdown: None,
        }
    }

    /// Lets deletion confirmation waits end early once shutdown is signalled.
    #[must_use]
    pub fn with_shutdown_signal(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Returns true once shutdown has been signalled.
    fn shutdown_signalled(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|shutdown| *shutdown.borrow())
    }

    /// Returns the policy applied to every cycle.
    #[must_use]
    pub fn policy(&self) -> &CleanupPolicy {
        &self.policy
    }

    /// Returns the notification dispatcher.
    #[must_use]
    pub fn notifications(&self) -> &NotificationService {
        &self.notifications
    }
}

fn log_notification_failure(event: &str, result: AppResult<()>) {
    if let Err(error) = result {
        warn!(event, error = %error, "failed to send notification");
    }
}

async fn shutdown_requested(shutdown: Option<watch::Receiver<bool>>) {
    let Some(mut shutdown) = shutdown else {
        return std::future::pending().await;
    };

    if shutdown.wait_for(|requested| *requested).await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn duration_label(duration: Duration) -> String {
    humantime_serde::re::humantime::format_duration(duration).to_string()
}
