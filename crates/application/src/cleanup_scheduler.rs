use std::time::Duration;

use kube_ns_gc_core::{AppError, AppResult};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::cleanup_service::CleanupService;

/// Drives cleanup cycles on a fixed interval until shutdown is signalled.
///
/// The first cycle starts immediately. Cycles never overlap: a tick that
/// arrives while a cycle is running is delayed until it finishes.
pub struct CleanupScheduler {
    service: CleanupService,
    interval: Duration,
}

impl CleanupScheduler {
    /// Creates a scheduler for a non-zero interval.
    pub fn new(service: CleanupService, interval: Duration) -> AppResult<Self> {
        if interval.is_zero() {
            return Err(AppError::Validation(
                "cleanup interval must be greater than zero".to_owned(),
            ));
        }

        Ok(Self { service, interval })
    }

    /// Returns the configured interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs cycles until `shutdown` becomes true or its sender is dropped.
    ///
    /// Returns the number of cycles started. A cycle in flight when shutdown
    /// is signalled runs to completion.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> u64 {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval = %humantime_serde::re::humantime::format_duration(self.interval),
            max_age = %humantime_serde::re::humantime::format_duration(
                self.service.policy().max_age()
            ),
            "cleanup scheduler started"
        );

        let mut cycles = 0_u64;
        loop {
            tokio::select! {
                biased;
                () = shutdown_requested(&mut shutdown) => {
                    info!(cycles, "cleanup scheduler stopping");
                    return cycles;
                }
                _ = ticker.tick() => {
                    cycles = cycles.saturating_add(1);
                    if let Err(error) = self.service.run_cycle().await {
                        warn!(cycle = cycles, error = %error, "cleanup cycle aborted");
                    }
                }
            }
        }
    }
}

/// Resolves once shutdown is requested or the sender is gone.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    // The `Ref` returned by `wait_for` must not outlive this future.
    let _ = shutdown.wait_for(|requested| *requested).await;
}
