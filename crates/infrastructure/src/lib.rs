//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod helm_cli_release_manager;
mod kube_cluster_client;
mod telegram_notifier;

pub use helm_cli_release_manager::HelmCliReleaseManager;
pub use kube_cluster_client::KubeClusterClient;
pub use telegram_notifier::{TelegramConfig, TelegramNotifier};
