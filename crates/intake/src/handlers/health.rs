//! Health check handler

use crate::IntakeState;
use axum::{extract::State, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// `live` with a document store, `degraded` without one
    pub mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Liveness plus document store reachability. Degraded mode is still healthy.
pub async fn health(State(state): State<IntakeState>) -> Json<HealthResponse> {
    let Some(store) = state.store else {
        return Json(HealthResponse {
            status: "healthy".to_string(),
            mode: super::manual::MODE_DEGRADED,
            store: None,
            error: None,
        });
    };

    let (status, error) = match store.ping().await {
        Ok(()) => ("healthy", None),
        Err(e) => ("unhealthy", Some(e.to_string())),
    };

    Json(HealthResponse {
        status: status.to_string(),
        mode: super::manual::MODE_LIVE,
        store: Some(store.backend_name().to_string()),
        error,
    })
}
