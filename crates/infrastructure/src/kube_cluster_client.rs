use async_trait::async_trait;
use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Namespace;
use kube::Client;
use kube::api::{Api, DeleteParams, ListParams};
use kube_ns_gc_application::ClusterClient;
use kube_ns_gc_core::{AppError, AppResult};
use kube_ns_gc_domain::NamespaceDescriptor;

/// Kubernetes API implementation of the cluster port.
#[derive(Clone)]
pub struct KubeClusterClient {
    namespaces: Api<Namespace>,
}

impl KubeClusterClient {
    /// Creates a cluster client over an existing kube client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            namespaces: Api::all(client),
        }
    }

    /// Builds a client from in-cluster configuration, falling back to kubeconfig.
    pub async fn try_default() -> AppResult<Self> {
        let client = Client::try_default().await.map_err(|error| {
            AppError::Internal(format!("failed to create kubernetes client: {error}"))
        })?;

        Ok(Self::new(client))
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn list_namespaces(&self) -> AppResult<Vec<NamespaceDescriptor>> {
        let namespaces = self
            .namespaces
            .list(&ListParams::default())
            .await
            .map_err(|error| map_kube_error(error, "namespaces"))?;

        namespaces.items.into_iter().map(namespace_descriptor).collect()
    }

    async fn delete_namespace(&self, name: &str) -> AppResult<()> {
        self.namespaces
            .delete(name, &DeleteParams::default())
            .await
            .map(|_| ())
            .map_err(|error| map_kube_error(error, format!("namespace '{name}'").as_str()))
    }

    async fn get_namespace(&self, name: &str) -> AppResult<NamespaceDescriptor> {
        let namespace = self
            .namespaces
            .get(name)
            .await
            .map_err(|error| map_kube_error(error, format!("namespace '{name}'").as_str()))?;

        namespace_descriptor(namespace)
    }
}

fn namespace_descriptor(namespace: Namespace) -> AppResult<NamespaceDescriptor> {
    let metadata = namespace.metadata;
    let name = metadata
        .name
        .ok_or_else(|| {
            AppError::External("namespace without a name in API response".to_owned())
        })?;
    let created_at: DateTime<Utc> = metadata
        .creation_timestamp
        .map(|timestamp| timestamp.0)
        .ok_or_else(|| {
            AppError::External(format!(
                "namespace '{name}' has no creation timestamp in API response"
            ))
        })?;

    NamespaceDescriptor::new(name, created_at, metadata.labels.unwrap_or_default())
}

fn map_kube_error(error: kube::Error, resource: &str) -> AppError {
    match error {
        kube::Error::Api(response) if response.code == 404 => {
            AppError::NotFound(resource.to_owned())
        }
        other => AppError::External(format!(
            "kubernetes API request for {resource} failed: {other}"
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{TimeZone, Utc};
    use k8s_openapi::api::core::v1::Namespace;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
    use kube::error::ErrorResponse;

    use super::{map_kube_error, namespace_descriptor};

    fn api_error(code: u16) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_owned(),
            message: "namespaces \"demo\" not found".to_owned(),
            reason: "NotFound".to_owned(),
            code,
        })
    }

    #[test]
    fn not_found_response_maps_to_not_found() {
        let error = map_kube_error(api_error(404), "namespace 'demo'");

        assert!(error.is_not_found());
        assert_eq!(error.to_string(), "not found: namespace 'demo'");
    }

    #[test]
    fn other_api_responses_map_to_external() {
        let error = map_kube_error(api_error(403), "namespaces");

        assert!(!error.is_not_found());
        assert!(error.to_string().starts_with("external error:"));
    }

    #[test]
    fn namespace_metadata_becomes_descriptor() {
        let created_at = Utc
            .with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .unwrap_or_else(|| unreachable!());
        let namespace = Namespace {
            metadata: ObjectMeta {
                name: Some("preview-42".to_owned()),
                creation_timestamp: Some(Time(created_at)),
                labels: Some(BTreeMap::from([(
                    "kube-ns-gc.ignore".to_owned(),
                    "true".to_owned(),
                )])),
                ..ObjectMeta::default()
            },
            ..Namespace::default()
        };

        let descriptor = namespace_descriptor(namespace).unwrap_or_else(|_| unreachable!());

        assert_eq!(descriptor.name(), "preview-42");
        assert_eq!(descriptor.created_at(), created_at);
        assert!(descriptor.has_label("kube-ns-gc.ignore"));
    }

    #[test]
    fn namespace_without_timestamp_is_rejected() {
        let namespace = Namespace {
            metadata: ObjectMeta {
                name: Some("preview-42".to_owned()),
                ..ObjectMeta::default()
            },
            ..Namespace::default()
        };

        assert!(namespace_descriptor(namespace).is_err());
    }
}
