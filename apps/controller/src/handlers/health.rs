use axum::Json;
use axum::extract::State;
use chrono::Utc;
use tracing::warn;

use crate::dto::{HealthResponse, MetricsResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

pub async fn metrics_handler(State(state): State<AppState>) -> ApiResult<Json<MetricsResponse>> {
    let snapshot = state
        .metrics_service
        .snapshot(Utc::now())
        .await
        .inspect_err(|error| warn!(error = %error, "failed to compute namespace metrics"))?;

    Ok(Json(MetricsResponse::from(snapshot)))
}
