use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use kube_ns_gc_core::{AppError, AppResult};
use tracing::debug;

use crate::cleanup_ports::Notifier;

mod messages;

/// Per-event enable flags for outbound notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationToggles {
    /// Service started.
    pub startup: bool,
    /// Namespace deletion confirmed.
    pub namespace_deleted: bool,
    /// Release uninstalled.
    pub release_deleted: bool,
    /// Cycle summary.
    pub cleanup_summary: bool,
    /// Cycle or namespace failure.
    pub errors: bool,
}

impl Default for NotificationToggles {
    fn default() -> Self {
        Self {
            startup: true,
            namespace_deleted: true,
            release_deleted: true,
            cleanup_summary: true,
            errors: true,
        }
    }
}

/// Best-effort dispatcher for cleanup lifecycle events.
///
/// Without a notifier every method is a no-op. Callers always invoke the
/// method for an event and let the dispatcher decide whether to send.
#[derive(Clone)]
pub struct NotificationService {
    notifier: Option<Arc<dyn Notifier>>,
    toggles: NotificationToggles,
}

impl NotificationService {
    /// Creates a dispatcher that sends enabled events through `notifier`.
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>, toggles: NotificationToggles) -> Self {
        Self {
            notifier: Some(notifier),
            toggles,
        }
    }

    /// Creates an unconfigured dispatcher.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            notifier: None,
            toggles: NotificationToggles::default(),
        }
    }

    /// Returns whether a notifier target is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.notifier.is_some()
    }

    /// Announces that the collector started.
    pub async fn notify_startup(&self) -> AppResult<()> {
        self.dispatch("startup", self.toggles.startup, || {
            messages::startup(Utc::now())
        })
        .await
    }

    /// Announces a confirmed namespace deletion.
    pub async fn notify_namespace_deleted(&self, namespace: &str, age: TimeDelta) -> AppResult<()> {
        self.dispatch("namespace_deleted", self.toggles.namespace_deleted, || {
            messages::namespace_deleted(namespace, age, Utc::now())
        })
        .await
    }

    /// Announces a successful release uninstall.
    pub async fn notify_release_deleted(&self, release: &str, namespace: &str) -> AppResult<()> {
        self.dispatch("release_deleted", self.toggles.release_deleted, || {
            messages::release_deleted(release, namespace, Utc::now())
        })
        .await
    }

    /// Reports the outcome of one cleanup cycle.
    pub async fn notify_cleanup_summary(
        &self,
        total: usize,
        cleaned: usize,
        duration: Duration,
    ) -> AppResult<()> {
        self.dispatch("cleanup_summary", self.toggles.cleanup_summary, || {
            messages::cleanup_summary(total, cleaned, duration, Utc::now())
        })
        .await
    }

    /// Reports a failure with its context.
    pub async fn notify_error(&self, context: &str, error: &AppError) -> AppResult<()> {
        self.dispatch("error", self.toggles.errors, || {
            messages::error(context, error, Utc::now())
        })
        .await
    }

    async fn dispatch<F>(&self, event: &'static str, enabled: bool, render: F) -> AppResult<()>
    where
        F: FnOnce() -> String,
    {
        let Some(notifier) = self.notifier.as_ref() else {
            return Ok(());
        };

        if !enabled {
            debug!(event, "notification disabled");
            return Ok(());
        }

        notifier
            .send(render().as_str())
            .await
            .map_err(|error| error.context(format!("failed to send {event} notification")))?;

        debug!(event, "notification sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
