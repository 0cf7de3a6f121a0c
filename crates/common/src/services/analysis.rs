//! Paid contract analysis

use super::LegalServices;
use crate::db::models::Contract;
use crate::db::AnalysisCommit;
use crate::errors::{AppError, Result};
use crate::llm::LlmOutcome;
use tracing::{info, instrument};
use uuid::Uuid;

impl LegalServices {
    /// Analyse one of the caller's contracts.
    ///
    /// Order of checks: ownership, profile, balance. Nothing is written unless
    /// the AI call succeeds; then the contract, the audit record and the
    /// balance are committed together.
    #[instrument(skip(self))]
    pub async fn run_analysis(&self, owner_id: Uuid, contract_id: Uuid) -> Result<Contract> {
        let contract = self.get_contract(owner_id, contract_id).await?;
        let profile = self.profile(owner_id).await?;
        self.admission.check(&profile, "analyze")?;

        let result = self.llm.analyze(&contract.original_text).await;
        let analysis = match result.outcome {
            LlmOutcome::Ok(analysis) => analysis,
            LlmOutcome::Error(message) => return Err(AppError::AiService { message }),
        };

        let outcome = self
            .store
            .commit_analysis(AnalysisCommit {
                owner_id,
                contract_id: contract.id,
                results: serde_json::to_value(&analysis)?,
                tokens_used: result.tokens_used,
            })
            .await?;

        info!(
            contract_id = %contract.id,
            tokens_used = result.tokens_used,
            tokens_remaining = outcome.profile.tokens_remaining,
            rating = analysis.rating,
            "Contract analysed"
        );

        Ok(outcome.contract)
    }
}
