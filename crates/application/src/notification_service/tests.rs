use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use kube_ns_gc_core::AppError;

use crate::test_fakes::RecordingNotifier;

use super::{NotificationService, NotificationToggles};

#[tokio::test]
async fn unconfigured_dispatcher_is_a_silent_no_op() {
    let service = NotificationService::disabled();

    assert!(!service.is_configured());
    assert!(service.notify_startup().await.is_ok());
    assert!(
        service
            .notify_error("Failed to list namespaces", &AppError::External("x".to_owned()))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn disabled_event_kind_sends_nothing() {
    let notifier = Arc::new(RecordingNotifier::default());
    let service = NotificationService::new(
        notifier.clone(),
        NotificationToggles {
            release_deleted: false,
            ..NotificationToggles::default()
        },
    );

    assert!(service.notify_release_deleted("app", "demo").await.is_ok());
    assert!(
        service
            .notify_namespace_deleted("demo", TimeDelta::days(10))
            .await
            .is_ok()
    );

    let messages = notifier.messages.lock().await;
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Namespace Deleted"));
}

#[tokio::test]
async fn every_enabled_event_kind_reaches_the_notifier() {
    let notifier = Arc::new(RecordingNotifier::default());
    let service = NotificationService::new(notifier.clone(), NotificationToggles::default());

    assert!(service.notify_startup().await.is_ok());
    assert!(
        service
            .notify_namespace_deleted("demo", TimeDelta::days(10))
            .await
            .is_ok()
    );
    assert!(service.notify_release_deleted("app", "demo").await.is_ok());
    assert!(
        service
            .notify_cleanup_summary(5, 1, Duration::from_secs(42))
            .await
            .is_ok()
    );
    assert!(
        service
            .notify_error("Failed to list namespaces", &AppError::External("x".to_owned()))
            .await
            .is_ok()
    );

    assert_eq!(notifier.messages.lock().await.len(), 5);
    assert_eq!(notifier.messages_containing("kube-ns-gc Started").await, 1);
    assert_eq!(notifier.messages_containing("Cleanup Summary").await, 1);
    assert_eq!(notifier.messages_containing("*Error*").await, 1);
}

#[tokio::test]
async fn send_failure_is_reported_with_event_context() {
    let notifier = Arc::new(RecordingNotifier::default());
    *notifier.fail.lock().await = true;
    let service = NotificationService::new(notifier, NotificationToggles::default());

    let result = service.notify_startup().await;

    assert!(result.is_err());
    let message = result.err().map(|error| error.to_string()).unwrap_or_default();
    assert!(message.contains("failed to send startup notification"));
}
