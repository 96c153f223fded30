use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

/// Liveness probe.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "grammar-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe: the completion provider must be configured.
pub async fn readiness_check(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.checker.health_check().await.map_err(|e| {
        tracing::warn!(error = %e, "Completion provider not ready");
        AppError::ServiceUnavailable
    })?;
    Ok(StatusCode::OK)
}
