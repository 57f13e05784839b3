//! Health endpoint. Always answers, even without a downstream credential.

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use relay_core::models::HealthResponse;

use crate::AppState;

/// `GET /api/health` — liveness plus whether the downstream is configured.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        timestamp: Utc::now(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        environment: state.environment.to_string(),
        configured: state.is_configured(),
        version: relay_core::version().to_string(),
    })
}
