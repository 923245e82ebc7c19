use std::time::Duration;

use async_trait::async_trait;
use kube_ns_gc_core::AppResult;
use kube_ns_gc_domain::ReleaseDescriptor;

/// Port for package-manager releases installed in namespaces.
#[async_trait]
pub trait ReleaseManager: Send + Sync {
    /// Lists releases in one namespace, in any state.
    async fn list_releases(&self, namespace: &str) -> AppResult<Vec<ReleaseDescriptor>>;

    /// Uninstalls one release and waits for its resources to be removed.
    async fn uninstall_release(
        &self,
        name: &str,
        namespace: &str,
        timeout: Duration,
    ) -> AppResult<()>;
}
