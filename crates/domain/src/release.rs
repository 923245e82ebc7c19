/// Helm release installed inside one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDescriptor {
    /// Release name, unique within its namespace.
    pub name: String,
    /// Namespace that owns the release.
    pub namespace: String,
    /// Release status as reported by the release manager (e.g. `deployed`).
    pub status: String,
    /// Monotonic revision number.
    pub revision: u32,
}
