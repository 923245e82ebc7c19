use std::collections::BTreeSet;
use std::time::Duration;

use chrono::TimeDelta;
use kube_ns_gc_core::{AppError, AppResult, NonEmptyString};

/// How long a namespace delete may take before it is reported as timed out.
pub const DEFAULT_DELETION_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Interval between namespace existence checks while confirming a delete.
pub const DEFAULT_DELETION_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Immutable cleanup policy applied to every namespace of a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupPolicy {
    max_age: Duration,
    max_age_delta: TimeDelta,
    excluded_names: BTreeSet<String>,
    ignore_label_key: Option<NonEmptyString>,
    release_uninstall_timeout: Duration,
    deletion_timeout: Duration,
    deletion_poll_interval: Duration,
}

/// Input payload used to construct a validated cleanup policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupPolicyInput {
    /// Age a namespace must exceed before it becomes eligible.
    pub max_age: Duration,
    /// Namespace names that are never collected.
    pub excluded_names: Vec<String>,
    /// Label key whose presence exempts a namespace. Blank means disabled.
    pub ignore_label_key: Option<String>,
    /// Timeout passed to every release uninstall.
    pub release_uninstall_timeout: Duration,
    /// Upper bound on the namespace deletion confirmation wait.
    pub deletion_timeout: Duration,
    /// Interval between confirmation polls.
    pub deletion_poll_interval: Duration,
}

impl CleanupPolicyInput {
    /// Creates an input with the default deletion timeout and poll interval.
    #[must_use]
    pub fn new(max_age: Duration, release_uninstall_timeout: Duration) -> Self {
        Self {
            max_age,
            excluded_names: Vec::new(),
            ignore_label_key: None,
            release_uninstall_timeout,
            deletion_timeout: DEFAULT_DELETION_TIMEOUT,
            deletion_poll_interval: DEFAULT_DELETION_POLL_INTERVAL,
        }
    }
}

impl CleanupPolicy {
    /// Creates a validated cleanup policy.
    pub fn new(input: CleanupPolicyInput) -> AppResult<Self> {
        let CleanupPolicyInput {
            max_age,
            excluded_names,
            ignore_label_key,
            release_uninstall_timeout,
            deletion_timeout,
            deletion_poll_interval,
        } = input;

        require_positive("max_age", max_age)?;
        require_positive("release_uninstall_timeout", release_uninstall_timeout)?;
        require_positive("deletion_timeout", deletion_timeout)?;
        require_positive("deletion_poll_interval", deletion_poll_interval)?;

        let max_age_delta = TimeDelta::from_std(max_age).map_err(|error| {
            AppError::Validation(format!("max_age {max_age:?} is out of range: {error}"))
        })?;

        let excluded_names = excluded_names
            .into_iter()
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())
            .collect();

        let ignore_label_key = ignore_label_key
            .map(|key| key.trim().to_owned())
            .filter(|key| !key.is_empty())
            .map(NonEmptyString::new)
            .transpose()?;

        Ok(Self {
            max_age,
            max_age_delta,
            excluded_names,
            ignore_label_key,
            release_uninstall_timeout,
            deletion_timeout,
            deletion_poll_interval,
        })
    }

    /// Returns the configured maximum namespace age.
    #[must_use]
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Returns the maximum age as a signed delta for timestamp arithmetic.
    #[must_use]
    pub fn max_age_delta(&self) -> TimeDelta {
        self.max_age_delta
    }

    /// Returns the excluded namespace names.
    #[must_use]
    pub fn excluded_names(&self) -> &BTreeSet<String> {
        &self.excluded_names
    }

    /// Returns true when `name` is excluded (exact, case-sensitive match).
    #[must_use]
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded_names.contains(name)
    }

    /// Returns the ignore label key, if configured.
    #[must_use]
    pub fn ignore_label_key(&self) -> Option<&str> {
        self.ignore_label_key.as_ref().map(NonEmptyString::as_str)
    }

    /// Returns the per-release uninstall timeout.
    #[must_use]
    pub fn release_uninstall_timeout(&self) -> Duration {
        self.release_uninstall_timeout
    }

    /// Returns the namespace deletion confirmation timeout.
    #[must_use]
    pub fn deletion_timeout(&self) -> Duration {
        self.deletion_timeout
    }

    /// Returns the namespace deletion poll interval.
    #[must_use]
    pub fn deletion_poll_interval(&self) -> Duration {
        self.deletion_poll_interval
    }
}

fn require_positive(field: &str, value: Duration) -> AppResult<()> {
    if value.is_zero() {
        return Err(AppError::Validation(format!(
            "{field} must be greater than zero"
        )));
    }

    Ok(())
}
