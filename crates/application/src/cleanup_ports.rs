mod cluster;
mod notifier;
mod releases;

pub use cluster::ClusterClient;
pub use notifier::Notifier;
pub use releases::ReleaseManager;
