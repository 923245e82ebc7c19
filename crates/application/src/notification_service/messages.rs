//! Markdown message bodies for each lifecycle event.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use humantime_serde::re::humantime::format_duration;
use kube_ns_gc_core::AppError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

pub(super) fn startup(at: DateTime<Utc>) -> String {
    format!(
        "🚀 *kube-ns-gc Started*\n\n\
         🕐 Time: {}\n\
         📋 Service is now monitoring namespaces for cleanup",
        at.format(TIMESTAMP_FORMAT)
    )
}

pub(super) fn namespace_deleted(namespace: &str, age: TimeDelta, at: DateTime<Utc>) -> String {
    format!(
        "🗑️ *Namespace Deleted*\n\n\
         📦 Namespace: `{namespace}`\n\
         ⏰ Age: {}\n\
         🕐 Time: {}",
        format_duration(round_to(age.to_std().unwrap_or_default(), 60)),
        at.format(TIMESTAMP_FORMAT)
    )
}

pub(super) fn release_deleted(release: &str, namespace: &str, at: DateTime<Utc>) -> String {
    format!(
        "🧹 *Helm Release Deleted*\n\n\
         📦 Release: `{release}`\n\
         🏠 Namespace: `{namespace}`\n\
         🕐 Time: {}",
        at.format(TIMESTAMP_FORMAT)
    )
}

pub(super) fn cleanup_summary(
    total: usize,
    cleaned: usize,
    duration: Duration,
    at: DateTime<Utc>,
) -> String {
    format!(
        "📊 *Cleanup Summary*\n\n\
         🔍 Total namespaces checked: {total}\n\
         🗑️ Namespaces deleted: {cleaned}\n\
         ⏱️ Cleanup duration: {}\n\
         🕐 Time: {}",
        format_duration(round_to(duration, 1)),
        at.format(TIMESTAMP_FORMAT)
    )
}

pub(super) fn error(context: &str, error: &AppError, at: DateTime<Utc>) -> String {
    format!(
        "❌ *Error*\n\n\
         📝 Message: {context}\n\
         🔍 Error: `{error}`\n\
         🕐 Time: {}",
        at.format(TIMESTAMP_FORMAT)
    )
}

/// Rounds half-up to a whole multiple of `unit_seconds`.
fn round_to(duration: Duration, unit_seconds: u64) -> Duration {
    let millis = duration.as_millis();
    let unit_millis = u128::from(unit_seconds) * 1000;
    let units = (millis + unit_millis / 2) / unit_millis;
    let seconds = u64::try_from(units * u128::from(unit_seconds)).unwrap_or(u64::MAX);
    Duration::from_secs(seconds)
}
