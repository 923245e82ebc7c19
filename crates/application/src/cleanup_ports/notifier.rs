use async_trait::async_trait;
use kube_ns_gc_core::AppResult;

/// Port for outbound text notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends one preformatted message.
    async fn send(&self, text: &str) -> AppResult<()>;
}
