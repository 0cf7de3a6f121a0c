//! Manual request handlers

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use validator::Validate;

use crate::IntakeState;
use smartlegal_common::{
    docstore::{ManualRequest, ManualRequestEntry, STATUS_NEW},
    errors::Result,
    extract::ValidatedJson,
    metrics,
};

pub const MODE_LIVE: &str = "live";
pub const MODE_DEGRADED: &str = "degraded";

/// Id of the placeholder row listed in degraded mode
pub const MOCK_LIST_ID: &str = "MOCK-001";

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub message: String,
    pub id: String,
    pub mode: &'static str,
}

/// Record a manual request.
///
/// Without a document store the request is acknowledged with a `MOCK-`
/// id and dropped.
pub async fn submit_request(
    State(state): State<IntakeState>,
    ValidatedJson(request): ValidatedJson<ManualRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>)> {
    let request = request.normalized();
    request.validate()?;

    let Some(store) = state.store else {
        let id = format!("MOCK-{}", Utc::now().timestamp());
        warn!(id = %id, "Degraded mode, manual request not persisted");
        metrics::record_manual_request(MODE_DEGRADED);

        return Ok((
            StatusCode::OK,
            Json(SubmitResponse {
                message: "Request received in demo mode; it was not saved.".to_string(),
                id,
                mode: MODE_DEGRADED,
            }),
        ));
    };

    let entry = store.submit(request).await?;
    metrics::record_manual_request(MODE_LIVE);
    info!(id = %entry.id, store = store.backend_name(), "Manual request stored");

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            message: "Request recorded and saved.".to_string(),
            id: entry.id,
            mode: MODE_LIVE,
        }),
    ))
}

/// All manual requests, newest first
pub async fn list_requests(
    State(state): State<IntakeState>,
) -> Result<Json<Vec<ManualRequestEntry>>> {
    match state.store {
        Some(store) => Ok(Json(store.list().await?)),
        None => Ok(Json(vec![mock_entry()])),
    }
}

fn mock_entry() -> ManualRequestEntry {
    ManualRequestEntry {
        id: MOCK_LIST_ID.to_string(),
        subject: "Sample request".to_string(),
        parties: "Party A - Party B".to_string(),
        description: "Shown because no document store is connected.".to_string(),
        outcome: "Demo".to_string(),
        status: STATUS_NEW.to_string(),
        created_at: Utc::now(),
    }
}
