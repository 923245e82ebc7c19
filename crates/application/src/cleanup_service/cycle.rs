use chrono::Utc;
use kube_ns_gc_domain::{CleanupCycleResult, Eligibility, NamespaceDescriptor, evaluate_eligibility};
use tracing::{debug, error, info, warn};

use super::*;

/// Failure of one namespace teardown, with the message used for notifications.
struct NamespaceFailure {
    context: String,
    error: AppError,
}

impl CleanupService {
    /// Runs one cleanup cycle over every namespace in the cluster.
    ///
    /// Fails only when the namespace listing fails; per-namespace failures are
    /// counted in the returned summary and never stop the cycle.
    pub async fn run_cycle(&self) -> AppResult<CleanupCycleResult> {
        let started = std::time::Instant::now();
        info!("starting namespace cleanup");

        let namespaces = match self.cluster.list_namespaces().await {
            Ok(namespaces) => namespaces,
            Err(list_error) => {
                let list_error = list_error.context("failed to list namespaces");
                error!(error = %list_error, "namespace cleanup aborted");
                log_notification_failure(
                    "error",
                    self.notifications
                        .notify_error("Failed to list namespaces", &list_error)
                        .await,
                );
                return Err(list_error);
            }
        };

        let now = Utc::now();
        let mut cleaned = 0_usize;
        let mut failed = 0_usize;

        for namespace in &namespaces {
            let eligibility = evaluate_eligibility(namespace, &self.policy, now);
            if eligibility != Eligibility::Eligible {
                debug!(
                    namespace = namespace.name(),
                    reason = eligibility.as_str(),
                    created_at = %namespace.created_at(),
                    "skipping namespace"
                );
                continue;
            }

            if self.shutdown_signalled() {
                info!(
                    namespace = namespace.name(),
                    "shutdown requested, leaving remaining namespaces for the next run"
                );
                break;
            }

            match self.teardown_namespace(namespace).await {
                Ok(()) => {
                    cleaned += 1;
                    let age = namespace.age_at(Utc::now());
                    info!(namespace = namespace.name(), "namespace cleaned up");
                    log_notification_failure(
                        "namespace_deleted",
                        self.notifications
                            .notify_namespace_deleted(namespace.name(), age)
                            .await,
                    );
                }
                Err(NamespaceFailure {
                    error: AppError::Cancelled(reason),
                    ..
                }) => {
                    warn!(
                        namespace = namespace.name(),
                        reason = %reason,
                        "namespace delete accepted, removal not confirmed before shutdown"
                    );
                }
                Err(failure) => {
                    failed += 1;
                    error!(
                        namespace = namespace.name(),
                        error = %failure.error,
                        "{}",
                        failure.context
                    );
                    log_notification_failure(
                        "error",
                        self.notifications
                            .notify_error(failure.context.as_str(), &failure.error)
                            .await,
                    );
                }
            }
        }

        let result = CleanupCycleResult {
            total: namespaces.len(),
            cleaned,
            failed,
            duration: started.elapsed(),
        };

        info!(
            total = result.total,
            cleaned = result.cleaned,
            failed = result.failed,
            duration_ms = u64::try_from(result.duration.as_millis()).unwrap_or(u64::MAX),
            "namespace cleanup completed"
        );
        log_notification_failure(
            "cleanup_summary",
            self.notifications
                .notify_cleanup_summary(result.total, result.cleaned, result.duration)
                .await,
        );

        Ok(result)
    }

    /// Uninstalls releases, then deletes the namespace and waits for removal.
    ///
    /// The namespace is left in place when any release could not be listed or
    /// uninstalled.
    async fn teardown_namespace(
        &self,
        namespace: &NamespaceDescriptor,
    ) -> Result<(), NamespaceFailure> {
        let name = namespace.name();
        let release_failure = |error: AppError| NamespaceFailure {
            context: format!("Failed to cleanup Helm releases in namespace {name}"),
            error,
        };

        let outcome = self.reap_releases(name).await.map_err(release_failure)?;
        if !outcome.is_clean() {
            let failed_releases = outcome
                .failures
                .iter()
                .map(|failure| failure.release.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let detail = outcome
                .failures
                .first()
                .map(|failure| failure.error.to_string())
                .unwrap_or_default();

            return Err(release_failure(AppError::External(format!(
                "{} of {} release uninstalls failed in namespace '{name}' ({failed_releases}); \
                 namespace left in place: {detail}",
                outcome.failures.len(),
                outcome.attempted
            ))));
        }

        self.delete_and_confirm(
            name,
            self.policy.deletion_timeout(),
            self.policy.deletion_poll_interval(),
        )
        .await
        .map_err(|error| NamespaceFailure {
            context: format!("Failed to delete namespace {name}"),
            error,
        })
    }
}
