//! kube-ns-gc composition root.

#![forbid(unsafe_code)]

mod dto;
mod error;
mod gc_config;
mod handlers;
mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use kube_ns_gc_application::{
    ClusterClient, CleanupScheduler, CleanupService, MetricsService, NotificationService,
    ReleaseManager,
};
use kube_ns_gc_core::{AppError, AppResult};
use kube_ns_gc_infrastructure::{
    HelmCliReleaseManager, KubeClusterClient, TelegramConfig, TelegramNotifier,
};
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::gc_config::{GcConfig, TelegramSettings, init_tracing};
use crate::handlers::health::{health_handler, metrics_handler};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    let config = match GcConfig::load() {
        Ok(config) => config,
        Err(load_error) => {
            init_tracing("info");
            error!(error = %load_error, "failed to load configuration");
            return Err(load_error);
        }
    };
    init_tracing(config.log_level.as_str());

    if let Err(startup_error) = run(config).await {
        error!(error = %startup_error, "kube-ns-gc exited with error");
        return Err(startup_error);
    }

    Ok(())
}

async fn run(config: GcConfig) -> AppResult<()> {
    let policy = config.cleanup_policy()?;
    let cluster: Arc<dyn ClusterClient> = Arc::new(KubeClusterClient::try_default().await?);
    let releases: Arc<dyn ReleaseManager> =
        Arc::new(HelmCliReleaseManager::new(config.helm_binary.as_str()));
    let notifications = build_notification_service(&config.telegram)?;

    let (shutdown_sender, shutdown_receiver) = watch::channel(false);
    let cleanup_service = CleanupService::new(
        cluster.clone(),
        releases,
        notifications.clone(),
        policy.clone(),
    )
    .with_shutdown_signal(shutdown_receiver.clone());
    let scheduler = CleanupScheduler::new(cleanup_service, config.cleanup_interval)?;

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState {
            metrics_service: MetricsService::new(cluster, policy, config.cleanup_interval),
        });

    let address = config.socket_address();
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(
        %address,
        excluded_namespaces = ?config.excluded_namespaces,
        ignore_label = %config.ignore_label,
        telegram = notifications.is_configured(),
        "kube-ns-gc started"
    );

    if let Err(error) = notifications.notify_startup().await {
        warn!(event = "startup", error = %error, "failed to send notification");
    }

    let scheduler_task = tokio::spawn(async move { scheduler.run(shutdown_receiver).await });

    let server_result = axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|error| AppError::Internal(format!("health server error: {error}")));

    let _ = shutdown_sender.send(true);
    let cycles = scheduler_task
        .await
        .map_err(|error| AppError::Internal(format!("cleanup scheduler task failed: {error}")))?;
    info!(cycles, "kube-ns-gc stopped");

    server_result
}

fn build_notification_service(settings: &TelegramSettings) -> AppResult<NotificationService> {
    if !settings.enabled {
        return Ok(NotificationService::disabled());
    }

    if !settings.is_usable() {
        warn!("telegram notifications enabled without bot token or chat id, disabling");
        return Ok(NotificationService::disabled());
    }

    let notifier = TelegramNotifier::new(TelegramConfig::new(
        settings.bot_token.as_str(),
        settings.chat_id.as_str(),
        settings.parse_mode.as_str(),
    ))?;

    Ok(NotificationService::new(
        Arc::new(notifier),
        settings.notifications,
    ))
}

/// Resolves on SIGINT or SIGTERM.
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let (mut sigint, mut sigterm) = match (
            signal(SignalKind::interrupt()),
            signal(SignalKind::terminate()),
        ) {
            (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
            (Err(error), _) | (_, Err(error)) => {
                warn!(error = %error, "failed to install signal handlers, falling back to ctrl-c");
                if tokio::signal::ctrl_c().await.is_err() {
                    std::future::pending::<()>().await;
                }
                return;
            }
        };

        tokio::select! {
            _ = sigint.recv() => info!("received SIGINT, shutting down"),
            _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        }
    }

    #[cfg(not(unix))]
    {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
        info!("received ctrl-c, shutting down");
    }
}
