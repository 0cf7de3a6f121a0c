//! Contract handlers
//!
//! Every route is scoped to the caller: another user's contract answers 404.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use smartlegal_common::{
    auth::AuthContext,
    db::{models::ClauseCategory, models::Contract, ContractChanges},
    errors::{AppError, Result},
    extract::ValidatedJson,
    services::{ContractDraft, GenerationRequest},
};

/// Request to upload a contract
#[derive(Debug, Deserialize, Validate)]
pub struct CreateContractRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[validate(length(min = 1))]
    pub original_text: String,
}

/// Partial update; status and analysis results are read-only here
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateContractRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub original_text: Option<String>,
}

/// Request to draft a contract from the knowledge base
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateContractRequest {
    /// Clause category code: GEN, EMP, REN or NDA
    pub contract_type: String,

    #[validate(length(max = 255))]
    pub title: Option<String>,

    /// Free-form drafting details; `keywords` narrows clause retrieval
    #[serde(default = "empty_details")]
    pub details: serde_json::Value,
}

fn empty_details() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

/// Contract as returned to clients
#[derive(Debug, Serialize)]
pub struct ContractResponse {
    pub id: Uuid,
    pub title: String,
    pub original_text: String,
    pub status: String,
    pub status_display: String,
    pub analysis_results: Option<serde_json::Value>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Contract> for ContractResponse {
    fn from(contract: Contract) -> Self {
        let status = contract.contract_status();
        Self {
            id: contract.id,
            title: contract.title,
            original_text: contract.original_text,
            status: status.as_str().to_string(),
            status_display: status.display_name().to_string(),
            analysis_results: contract.analysis_results,
            created_at: contract.created_at.to_rfc3339(),
            updated_at: contract.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateContractResponse {
    pub contract: ContractResponse,
    pub tokens_used: i32,
    pub clause_count: usize,
}

/// List the caller's contracts, newest first
pub async fn list_contracts(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<ContractResponse>>> {
    let contracts = state.services.list_contracts(auth.user_id).await?;
    Ok(Json(contracts.into_iter().map(ContractResponse::from).collect()))
}

/// Upload a contract
pub async fn create_contract(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(request): ValidatedJson<CreateContractRequest>,
) -> Result<(StatusCode, Json<ContractResponse>)> {
    let contract = state
        .services
        .create_contract(
            auth.user_id,
            ContractDraft {
                title: request.title,
                original_text: request.original_text,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(contract.into())))
}

pub async fn get_contract(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ContractResponse>> {
    let contract = state.services.get_contract(auth.user_id, id).await?;
    Ok(Json(contract.into()))
}

pub async fn update_contract(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateContractRequest>,
) -> Result<Json<ContractResponse>> {
    let changes = ContractChanges {
        title: request.title,
        original_text: request.original_text,
        status: None,
    };

    let contract = if changes.is_empty() {
        state.services.get_contract(auth.user_id, id).await?
    } else {
        state.services.update_contract(auth.user_id, id, changes).await?
    };

    Ok(Json(contract.into()))
}

pub async fn delete_contract(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.services.delete_contract(auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mark a contract archived
pub async fn archive_contract(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ContractResponse>> {
    let contract = state.services.archive_contract(auth.user_id, id).await?;
    Ok(Json(contract.into()))
}

/// Run the paid AI analysis and return the updated contract
pub async fn run_analysis(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ContractResponse>> {
    let contract = state.services.run_analysis(auth.user_id, id).await?;
    Ok(Json(contract.into()))
}

/// Draft a new contract from verified clauses
pub async fn generate_contract(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(request): ValidatedJson<GenerateContractRequest>,
) -> Result<(StatusCode, Json<GenerateContractResponse>)> {
    let category: ClauseCategory =
        request
            .contract_type
            .parse()
            .map_err(|message: String| AppError::Validation {
                message,
                field: Some("contract_type".to_string()),
            })?;

    if !request.details.is_object() {
        return Err(AppError::Validation {
            message: "details must be a JSON object".to_string(),
            field: Some("details".to_string()),
        });
    }

    let report = state
        .services
        .generate_contract(
            auth.user_id,
            GenerationRequest {
                category,
                title: request.title,
                details: request.details,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(GenerateContractResponse {
            contract: report.contract.into(),
            tokens_used: report.tokens_used,
            clause_count: report.clause_count,
        }),
    ))
}
