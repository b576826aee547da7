//! Health and readiness probes.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Readiness probe: verifies the queue connection.
pub async fn ready(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = match state.queue.len().await {
        Ok(_) => "ok",
        Err(_) => "degraded",
    };
    Json(HealthResponse { status })
}
