//! Health check handlers

use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub store: CheckResult,
    pub ai_service: CheckResult,
}

#[derive(Serialize)]
pub struct CheckResult {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Liveness probe - always returns healthy if server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: smartlegal_common::VERSION.to_string(),
    })
}

/// Readiness probe.
///
/// Only the store gates readiness. A missing AI key is reported but the
/// CRUD endpoints still work without one.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let store = state.services.store();
    let start = std::time::Instant::now();

    let store_check = match store.ping().await {
        Ok(()) => CheckResult {
            status: "up".to_string(),
            backend: Some(store.backend_name().to_string()),
            latency_ms: Some(start.elapsed().as_millis() as u64),
            error: None,
        },
        Err(e) => CheckResult {
            status: "down".to_string(),
            backend: Some(store.backend_name().to_string()),
            latency_ms: None,
            error: Some(e.to_string()),
        },
    };

    let llm = state.services.llm();
    let ai_check = CheckResult {
        status: if llm.is_configured() { "configured" } else { "missing_key" }.to_string(),
        backend: Some(llm.provider_name().to_string()),
        latency_ms: None,
        error: None,
    };

    let ready = store_check.status == "up";
    let status = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    (
        status,
        Json(ReadyResponse {
            status: if ready { "ready" } else { "not_ready" }.to_string(),
            checks: HealthChecks {
                store: store_check,
                ai_service: ai_check,
            },
        }),
    )
}
