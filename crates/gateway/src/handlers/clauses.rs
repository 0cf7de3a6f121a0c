//! Knowledge base retrieval handler

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use smartlegal_common::{
    auth::AuthContext,
    db::models::ClauseCategory,
    errors::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct ClauseQuery {
    /// Clause category code: GEN, EMP, REN or NDA
    pub clause_type: Option<String>,

    /// Case-insensitive filter over clause titles and bodies
    pub keywords: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClauseResponse {
    pub clause_type: String,
    pub keywords: Option<String>,
    /// Matching verified clauses rendered as `## title` blocks
    pub text: String,
    pub count: usize,
}

/// Verified clauses of one category. No match is an empty result, not an error.
pub async fn retrieve_clauses(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(query): Query<ClauseQuery>,
) -> Result<Json<ClauseResponse>> {
    let raw = query.clause_type.ok_or_else(|| AppError::MissingField {
        field: "clause_type".to_string(),
    })?;

    let category: ClauseCategory = raw.parse().map_err(|message: String| AppError::Validation {
        message,
        field: Some("clause_type".to_string()),
    })?;

    let keywords = query.keywords.filter(|k| !k.is_empty());
    let retrieved = state
        .services
        .retrieve_clauses(category, keywords.as_deref())
        .await?;

    Ok(Json(ClauseResponse {
        clause_type: category.as_str().to_string(),
        keywords,
        text: retrieved.text,
        count: retrieved.count,
    }))
}
