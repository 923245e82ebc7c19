use std::path::PathBuf;
use std::process::Output;
use std::time::Duration;

use async_trait::async_trait;
use kube_ns_gc_application::ReleaseManager;
use kube_ns_gc_core::{AppError, AppResult};
use kube_ns_gc_domain::ReleaseDescriptor;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

/// Extra time granted to the helm process beyond its own `--timeout`.
const UNINSTALL_GRACE: Duration = Duration::from_secs(30);

/// Bound on `helm list`, which never waits on cluster resources.
const LIST_TIMEOUT: Duration = Duration::from_secs(60);

/// Release manager backed by the `helm` command-line client.
#[derive(Debug, Clone)]
pub struct HelmCliReleaseManager {
    binary: PathBuf,
}

impl HelmCliReleaseManager {
    /// Creates a release manager that runs `binary`.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn run(&self, args: &[&str], limit: Duration, description: &str) -> AppResult<Output> {
        debug!(binary = %self.binary.display(), ?args, "running helm");

        let output = Command::new(&self.binary)
            .args(args)
            .kill_on_drop(true)
            .output();
        let output = tokio::time::timeout(limit, output)
            .await
            .map_err(|_| {
                AppError::Timeout(format!("helm {description} did not finish within {limit:?}"))
            })?
            .map_err(|error| {
                AppError::External(format!("failed to execute helm {description}: {error}"))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::External(format!(
                "helm {description} failed ({}): {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(output)
    }
}

impl Default for HelmCliReleaseManager {
    fn default() -> Self {
        Self::new("helm")
    }
}

#[async_trait]
impl ReleaseManager for HelmCliReleaseManager {
    async fn list_releases(&self, namespace: &str) -> AppResult<Vec<ReleaseDescriptor>> {
        let output = self.run(&list_args(namespace), LIST_TIMEOUT, "list").await?;

        parse_release_list(&output.stdout, namespace)
    }

    async fn uninstall_release(
        &self,
        name: &str,
        namespace: &str,
        timeout: Duration,
    ) -> AppResult<()> {
        let helm_timeout = format!("{}s", timeout.as_secs().max(1));
        self.run(
            &[
                "uninstall",
                name,
                "--namespace",
                namespace,
                "--wait",
                "--timeout",
                helm_timeout.as_str(),
            ],
            timeout.saturating_add(UNINSTALL_GRACE),
            "uninstall",
        )
        .await?;

        Ok(())
    }
}

/// Arguments for listing every release in `namespace`.
///
/// `helm list` returns 256 entries unless `--max 0` lifts the limit.
fn list_args(namespace: &str) -> [&str; 8] {
    [
        "list",
        "--namespace",
        namespace,
        "--all",
        "--max",
        "0",
        "--output",
        "json",
    ]
}

#[derive(Debug, Deserialize)]
struct HelmListEntry {
    name: String,
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    status: String,
    #[serde(default)]
    revision: String,
}

/// Parses `helm list --output json`. Releases from other namespaces are dropped.
fn parse_release_list(stdout: &[u8], namespace: &str) -> AppResult<Vec<ReleaseDescriptor>> {
    if stdout.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let entries: Vec<HelmListEntry> = serde_json::from_slice(stdout).map_err(|error| {
        AppError::External(format!("failed to parse helm list output: {error}"))
    })?;

    entries
        .into_iter()
        .filter(|entry| entry.namespace.as_deref().is_none_or(|owner| owner == namespace))
        .map(|entry| {
            let revision = entry.revision.trim().parse::<u32>().map_err(|error| {
                AppError::External(format!(
                    "helm release '{}' has invalid revision '{}': {error}",
                    entry.name, entry.revision
                ))
            })?;

            Ok(ReleaseDescriptor {
                name: entry.name,
                namespace: namespace.to_owned(),
                status: entry.status,
                revision,
            })
        })
        .collect()
}
