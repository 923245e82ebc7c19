use tracing::{debug, error, info};

use super::*;

impl CleanupService {
    /// Uninstalls every release in `namespace`, one at a time, in listing order.
    ///
    /// A failed uninstall is recorded and the remaining releases are still
    /// attempted. Only a failed release listing is returned as an error.
    pub async fn reap_releases(&self, namespace: &str) -> AppResult<ReapOutcome> {
        let releases = self
            .releases
            .list_releases(namespace)
            .await
            .map_err(|error| {
                error.context(format!("failed to list releases in namespace '{namespace}'"))
            })?;

        debug!(
            namespace,
            release_count = releases.len(),
            "uninstalling releases"
        );

        let timeout = self.policy.release_uninstall_timeout();
        let mut outcome = ReapOutcome::default();
        for release in releases {
            outcome.attempted += 1;
            debug!(
                namespace,
                release = %release.name,
                status = %release.status,
                revision = release.revision,
                "uninstalling release"
            );

            match self
                .releases
                .uninstall_release(release.name.as_str(), namespace, timeout)
                .await
            {
                Ok(()) => {
                    info!(namespace, release = %release.name, "release uninstalled");
                    log_notification_failure(
                        "release_deleted",
                        self.notifications
                            .notify_release_deleted(release.name.as_str(), namespace)
                            .await,
                    );
                }
                Err(uninstall_error) => {
                    let uninstall_error = uninstall_error.context(format!(
                        "failed to uninstall release '{}' in namespace '{namespace}'",
                        release.name
                    ));
                    error!(
                        namespace,
                        release = %release.name,
                        error = %uninstall_error,
                        "release uninstall failed"
                    );
                    outcome.failures.push(ReleaseFailure {
                        release: release.name,
                        error: uninstall_error,
                    });
                }
            }
        }

        Ok(outcome)
    }
}
