//! Application services and ports.

#![forbid(unsafe_code)]

mod cleanup_ports;
mod cleanup_scheduler;
mod cleanup_service;
mod metrics_service;
mod notification_service;

#[cfg(test)]
mod test_fakes;

pub use cleanup_ports::{ClusterClient, Notifier, ReleaseManager};
pub use cleanup_scheduler::CleanupScheduler;
pub use cleanup_service::{CleanupService, ReapOutcome, ReleaseFailure};
pub use metrics_service::{MetricsService, NamespaceMetricsSnapshot};
pub use notification_service::{NotificationService, NotificationToggles};
