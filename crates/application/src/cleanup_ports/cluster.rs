use async_trait::async_trait;
use kube_ns_gc_core::AppResult;
use kube_ns_gc_domain::NamespaceDescriptor;

/// Port for namespace operations against the cluster API.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Lists every namespace visible to the collector.
    async fn list_namespaces(&self) -> AppResult<Vec<NamespaceDescriptor>>;

    /// Requests deletion of one namespace. Returns once the request is accepted.
    async fn delete_namespace(&self, name: &str) -> AppResult<()>;

    /// Returns one namespace, or `AppError::NotFound` once it no longer exists.
    async fn get_namespace(&self, name: &str) -> AppResult<NamespaceDescriptor>;
}
