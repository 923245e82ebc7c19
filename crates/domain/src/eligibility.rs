use chrono::{DateTime, Utc};

use crate::{CleanupPolicy, NamespaceDescriptor};

/// Outcome of evaluating one namespace against the cleanup policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// Name is in the excluded set.
    Excluded,
    /// Namespace carries the ignore label.
    Ignored,
    /// Namespace is not older than the maximum age.
    TooYoung,
    /// Namespace should be torn down.
    Eligible,
}

impl Eligibility {
    /// Returns stable reason value for logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excluded => "excluded",
            Self::Ignored => "ignore_label",
            Self::TooYoung => "too_young",
            Self::Eligible => "eligible",
        }
    }
}

/// Evaluates exclusion, ignore label and age, in that order.
#[must_use]
pub fn evaluate_eligibility(
    namespace: &NamespaceDescriptor,
    policy: &CleanupPolicy,
    now: DateTime<Utc>,
) -> Eligibility {
    if policy.is_excluded(namespace.name()) {
        return Eligibility::Excluded;
    }

    if policy
        .ignore_label_key()
        .is_some_and(|key| namespace.has_label(key))
    {
        return Eligibility::Ignored;
    }

    if namespace.age_at(now) <= policy.max_age_delta() {
        return Eligibility::TooYoung;
    }

    Eligibility::Eligible
}

/// Returns true when the namespace should be torn down at `now`.
#[must_use]
pub fn is_eligible(
    namespace: &NamespaceDescriptor,
    policy: &CleanupPolicy,
    now: DateTime<Utc>,
) -> bool {
    evaluate_eligibility(namespace, policy, now) == Eligibility::Eligible
}
