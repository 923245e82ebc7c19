//! In-memory port implementations shared by service tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use kube_ns_gc_core::{AppError, AppResult};
use kube_ns_gc_domain::{NamespaceDescriptor, ReleaseDescriptor};
use tokio::sync::Mutex;

use crate::cleanup_ports::{ClusterClient, Notifier, ReleaseManager};

pub(crate) fn namespace_aged(
    name: &str,
    age: TimeDelta,
    labels: &[(&str, &str)],
) -> NamespaceDescriptor {
    let labels = labels
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect::<BTreeMap<_, _>>();

    NamespaceDescriptor::new(name, Utc::now() - age, labels).unwrap_or_else(|_| unreachable!())
}

pub(crate) fn release(name: &str, namespace: &str) -> ReleaseDescriptor {
    ReleaseDescriptor {
        name: name.to_owned(),
        namespace: namespace.to_owned(),
        status: "deployed".to_owned(),
        revision: 1,
    }
}

#[derive(Default)]
pub(crate) struct FakeClusterClient {
    pub(crate) namespaces: Mutex<Vec<NamespaceDescriptor>>,
    pub(crate) fail_list: Mutex<bool>,
    pub(crate) fail_delete: Mutex<HashSet<String>>,
    /// Namespaces that stay visible after their delete is accepted.
    pub(crate) lingering: Mutex<HashSet<String>>,
    pub(crate) delete_requests: Mutex<Vec<String>>,
    /// Lookups that fail with an external error before answering normally.
    pub(crate) flaky_lookups: Mutex<usize>,
    /// Lookups never answer.
    pub(crate) hang_lookups: Mutex<bool>,
    pub(crate) get_calls: Mutex<usize>,
    pub(crate) list_calls: Mutex<usize>,
}

impl FakeClusterClient {
    pub(crate) fn with_namespaces(namespaces: Vec<NamespaceDescriptor>) -> Self {
        Self {
            namespaces: Mutex::new(namespaces),
            ..Self::default()
        }
    }
}

#[async_trait]
impl ClusterClient for FakeClusterClient {
    async fn list_namespaces(&self) -> AppResult<Vec<NamespaceDescriptor>> {
        *self.list_calls.lock().await += 1;
        if *self.fail_list.lock().await {
            return Err(AppError::External("simulated list failure".to_owned()));
        }

        Ok(self.namespaces.lock().await.clone())
    }

    async fn delete_namespace(&self, name: &str) -> AppResult<()> {
        self.delete_requests.lock().await.push(name.to_owned());
        if self.fail_delete.lock().await.contains(name) {
            return Err(AppError::External(format!(
                "simulated delete failure for '{name}'"
            )));
        }

        if !self.lingering.lock().await.contains(name) {
            self.namespaces
                .lock()
                .await
                .retain(|namespace| namespace.name() != name);
        }

        Ok(())
    }

    async fn get_namespace(&self, name: &str) -> AppResult<NamespaceDescriptor> {
        *self.get_calls.lock().await += 1;
        if *self.hang_lookups.lock().await {
            std::future::pending::<()>().await;
        }

        {
            let mut flaky = self.flaky_lookups.lock().await;
            if *flaky > 0 {
                *flaky -= 1;
                return Err(AppError::External(
                    "simulated lookup failure: 503 service unavailable".to_owned(),
                ));
            }
        }

        self.namespaces
            .lock()
            .await
            .iter()
            .find(|namespace| namespace.name() == name)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("namespace '{name}'")))
    }
}

#[derive(Default)]
pub(crate) struct FakeReleaseManager {
    pub(crate) releases: Mutex<HashMap<String, Vec<ReleaseDescriptor>>>,
    pub(crate) fail_list: Mutex<HashSet<String>>,
    pub(crate) fail_uninstall: Mutex<HashSet<String>>,
    pub(crate) uninstall_attempts: Mutex<Vec<(String, String, Duration)>>,
}

impl FakeReleaseManager {
    pub(crate) fn with_releases(releases: Vec<ReleaseDescriptor>) -> Self {
        let mut by_namespace: HashMap<String, Vec<ReleaseDescriptor>> = HashMap::new();
        for release in releases {
            by_namespace
                .entry(release.namespace.clone())
                .or_default()
                .push(release);
        }

        Self {
            releases: Mutex::new(by_namespace),
            ..Self::default()
        }
    }
}

#[async_trait]
impl ReleaseManager for FakeReleaseManager {
    async fn list_releases(&self, namespace: &str) -> AppResult<Vec<ReleaseDescriptor>> {
        if self.fail_list.lock().await.contains(namespace) {
            return Err(AppError::External(format!(
                "simulated release listing failure for '{namespace}'"
            )));
        }

        Ok(self
            .releases
            .lock()
            .await
            .get(namespace)
            .cloned()
            .unwrap_or_default())
    }

    async fn uninstall_release(
        &self,
        name: &str,
        namespace: &str,
        timeout: Duration,
    ) -> AppResult<()> {
        self.uninstall_attempts
            .lock()
            .await
            .push((name.to_owned(), namespace.to_owned(), timeout));

        if self.fail_uninstall.lock().await.contains(name) {
            return Err(AppError::External(format!(
                "simulated uninstall failure for '{name}'"
            )));
        }

        if let Some(releases) = self.releases.lock().await.get_mut(namespace) {
            releases.retain(|release| release.name != name);
        }

        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    pub(crate) messages: Mutex<Vec<String>>,
    pub(crate) fail: Mutex<bool>,
}

impl RecordingNotifier {
    pub(crate) async fn messages_containing(&self, needle: &str) -> usize {
        self.messages
            .lock()
            .await
            .iter()
            .filter(|message| message.contains(needle))
            .count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> AppResult<()> {
        if *self.fail.lock().await {
            return Err(AppError::External("simulated notifier outage".to_owned()));
        }

        self.messages.lock().await.push(text.to_owned());
        Ok(())
    }
}
