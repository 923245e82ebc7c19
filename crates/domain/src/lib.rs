//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod cycle;
mod eligibility;
mod namespace;
mod policy;
mod release;

pub use cycle::CleanupCycleResult;
pub use eligibility::{Eligibility, evaluate_eligibility, is_eligible};
pub use namespace::NamespaceDescriptor;
pub use policy::{
    CleanupPolicy, CleanupPolicyInput, DEFAULT_DELETION_POLL_INTERVAL, DEFAULT_DELETION_TIMEOUT,
};
pub use release::ReleaseDescriptor;
