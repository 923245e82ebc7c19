use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use super::*;

impl CleanupService {
    /// Deletes `namespace` and waits until the cluster no longer reports it.
    ///
    /// The delete request is issued once. Lookups run every `poll_interval`;
    /// only a not-found answer ends the wait successfully, other lookup errors
    /// are retried. Fails with `AppError::Timeout` after `timeout`, or with
    /// `AppError::Cancelled` when shutdown is signalled during the wait.
    /// Both limits also apply to a lookup that is still in flight.
    pub async fn delete_and_confirm(
        &self,
        namespace: &str,
        timeout: Duration,
        poll_interval: Duration,
    ) -> AppResult<()> {
        self.cluster
            .delete_namespace(namespace)
            .await
            .map_err(|error| error.context(format!("failed to delete namespace '{namespace}'")))?;

        debug!(namespace, "namespace delete accepted, waiting for removal");

        let started = Instant::now();
        let deadline_at = started + timeout;
        let deadline = tokio::time::sleep_until(deadline_at);
        tokio::pin!(deadline);

        let mut ticker = tokio::time::interval_at(started + poll_interval, poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let shutdown = shutdown_requested(self.shutdown.clone());
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                () = &mut deadline => return Err(removal_timed_out(namespace, timeout)),
                () = &mut shutdown => return Err(removal_cancelled(namespace, started)),
                _ = ticker.tick() => {}
            }

            let lookup = tokio::select! {
                biased;
                () = &mut shutdown => return Err(removal_cancelled(namespace, started)),
                lookup = tokio::time::timeout_at(
                    deadline_at,
                    self.cluster.get_namespace(namespace),
                ) => lookup,
            };

            match lookup {
                Err(_) => return Err(removal_timed_out(namespace, timeout)),
                Ok(Err(error)) if error.is_not_found() => {
                    debug!(namespace, "namespace removal confirmed");
                    return Ok(());
                }
                Ok(Ok(_)) => debug!(namespace, "namespace still terminating"),
                Ok(Err(error)) => {
                    debug!(namespace, error = %error, "namespace lookup failed, retrying");
                }
            }
        }
    }
}

fn removal_timed_out(namespace: &str, timeout: Duration) -> AppError {
    AppError::Timeout(format!(
        "namespace '{namespace}' still present {} after delete",
        duration_label(timeout)
    ))
}

fn removal_cancelled(namespace: &str, started: Instant) -> AppError {
    AppError::Cancelled(format!(
        "stopped waiting for namespace '{namespace}' removal after {}",
        duration_label(started.elapsed())
    ))
}
