//! Retrieval-augmented contract drafting

use super::LegalServices;
use crate::db::models::{ClauseCategory, Contract};
use crate::db::GenerationCommit;
use crate::errors::{AppError, Result};
use crate::llm::LlmOutcome;
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

/// What the caller wants drafted
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub category: ClauseCategory,
    pub title: Option<String>,
    /// Free-form details; a string `keywords` entry narrows clause retrieval
    pub details: serde_json::Value,
}

impl GenerationRequest {
    pub fn keywords(&self) -> Result<Option<&str>> {
        match self.details.get("keywords") {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(k)) => Ok(Some(k.as_str())),
            Some(_) => Err(AppError::Validation {
                message: "details.keywords must be a string".to_string(),
                field: Some("details.keywords".to_string()),
            }),
        }
    }

    fn title(&self) -> String {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .unwrap_or_else(|| format!("{} contract", self.category.display_name()))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub contract: Contract,
    pub tokens_used: i32,
    pub clause_count: usize,
}

impl LegalServices {
    /// Draft a new contract from verified clauses.
    ///
    /// Refuses without calling the AI when the balance is too low or when no
    /// verified clause matches.
    #[instrument(skip(self, request), fields(category = %request.category))]
    pub async fn generate_contract(
        &self,
        owner_id: Uuid,
        request: GenerationRequest,
    ) -> Result<GenerationReport> {
        let keywords = request.keywords()?;
        let profile = self.profile(owner_id).await?;
        self.admission.check(&profile, "generate")?;

        let clauses = self.retrieve_clauses(request.category, keywords).await?;
        if clauses.is_empty() {
            return Err(AppError::NoVerifiedClauses {
                category: request.category.as_str().to_string(),
                keyword: keywords.map(String::from),
            });
        }

        let result = self
            .llm
            .generate(request.category, &request.details, &clauses.text)
            .await;
        let generated = match result.outcome {
            LlmOutcome::Ok(generated) => generated,
            LlmOutcome::Error(message) => return Err(AppError::AiService { message }),
        };

        let outcome = self
            .store
            .commit_generation(GenerationCommit {
                owner_id,
                title: request.title(),
                contract_text: generated.contract_text,
                tokens_used: result.tokens_used,
            })
            .await?;

        info!(
            contract_id = %outcome.contract.id,
            clause_count = clauses.count,
            tokens_used = result.tokens_used,
            tokens_remaining = outcome.profile.tokens_remaining,
            "Contract generated"
        );

        Ok(GenerationReport {
            contract: outcome.contract,
            tokens_used: result.tokens_used,
            clause_count: clauses.count,
        })
    }
}
