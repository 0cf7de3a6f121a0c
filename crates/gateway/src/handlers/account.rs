//! Token balance and usage history

use axum::{extract::State, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::AppState;
use smartlegal_common::{
    auth::AuthContext,
    db::models::{ServiceRequest, UserProfile},
    errors::Result,
};

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub subscription_level: String,
    /// Negative when the last paid call cost more than the admission estimate
    pub tokens_remaining: i32,
}

impl From<UserProfile> for ProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            subscription_level: profile.subscription_level,
            tokens_remaining: profile.tokens_remaining,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ServiceRequestResponse {
    pub id: Uuid,
    pub service_type: String,
    pub service_type_display: String,
    pub tokens_used: i32,
    pub is_paid: bool,
    pub related_contract_id: Option<Uuid>,
    pub request_timestamp: String,
}

impl From<ServiceRequest> for ServiceRequestResponse {
    fn from(request: ServiceRequest) -> Self {
        let kind = request.kind();
        Self {
            id: request.id,
            service_type: kind.as_str().to_string(),
            service_type_display: kind.display_name().to_string(),
            tokens_used: request.tokens_used,
            is_paid: request.is_paid,
            related_contract_id: request.related_contract_id,
            request_timestamp: request.request_timestamp.to_rfc3339(),
        }
    }
}

pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ProfileResponse>> {
    let profile = state.services.profile(auth.user_id).await?;
    Ok(Json(profile.into()))
}

/// The caller's paid calls, newest first
pub async fn list_service_requests(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<ServiceRequestResponse>>> {
    let requests = state.services.service_requests(auth.user_id).await?;
    Ok(Json(requests.into_iter().map(ServiceRequestResponse::from).collect()))
}
