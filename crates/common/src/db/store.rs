//! Storage abstraction shared by the SeaORM repository and the in-memory store

use crate::db::models::{
    ClauseCategory, Contract, ContractStatus, KnowledgeBaseClause, ServiceRequest, UserProfile,
};
use crate::errors::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Fields of a contract being created
#[derive(Debug, Clone)]
pub struct NewContract {
    pub title: String,
    pub original_text: String,
    pub status: ContractStatus,
}

/// Partial update of a contract. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct ContractChanges {
    pub title: Option<String>,
    pub original_text: Option<String>,
    pub status: Option<ContractStatus>,
}

impl ContractChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.original_text.is_none() && self.status.is_none()
    }
}

/// Successful analysis to be committed in one unit
#[derive(Debug, Clone)]
pub struct AnalysisCommit {
    pub owner_id: Uuid,
    pub contract_id: Uuid,
    pub results: serde_json::Value,
    pub tokens_used: i32,
}

/// Successful generation to be committed in one unit
#[derive(Debug, Clone)]
pub struct GenerationCommit {
    pub owner_id: Uuid,
    pub title: String,
    pub contract_text: String,
    pub tokens_used: i32,
}

/// The three records touched by a paid AI call
#[derive(Debug, Clone)]
pub struct CommitOutcome {
    pub contract: Contract,
    pub service_request: ServiceRequest,
    pub profile: UserProfile,
}

/// Persistence operations for contracts, profiles, audit records and clauses.
///
/// Every contract read or write is scoped to its owner: a contract belonging
/// to someone else is indistinguishable from a missing one.
#[async_trait]
pub trait ContractStore: Send + Sync {
    /// Backend name for logs and health output
    fn backend_name(&self) -> &'static str;

    /// Check connectivity
    async fn ping(&self) -> Result<()>;

    /// Contracts of one owner, newest first
    async fn list_contracts(&self, owner_id: Uuid) -> Result<Vec<Contract>>;

    async fn create_contract(&self, owner_id: Uuid, contract: NewContract) -> Result<Contract>;

    async fn find_contract(&self, owner_id: Uuid, contract_id: Uuid) -> Result<Option<Contract>>;

    async fn update_contract(
        &self,
        owner_id: Uuid,
        contract_id: Uuid,
        changes: ContractChanges,
    ) -> Result<Option<Contract>>;

    /// Delete a contract; audit records keep existing with the reference cleared
    async fn delete_contract(&self, owner_id: Uuid, contract_id: Uuid) -> Result<bool>;

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>>;

    /// Return the profile, creating it with the given defaults if absent
    async fn ensure_profile(
        &self,
        user_id: Uuid,
        subscription_level: &str,
        tokens: i32,
    ) -> Result<UserProfile>;

    /// Audit records of one owner, newest first
    async fn list_service_requests(&self, owner_id: Uuid) -> Result<Vec<ServiceRequest>>;

    /// Verified clauses of a category, ordered by title
    async fn verified_clauses(&self, category: ClauseCategory) -> Result<Vec<KnowledgeBaseClause>>;

    /// Mark the contract analysed, append the audit record and debit the
    /// balance, all or nothing.
    async fn commit_analysis(&self, commit: AnalysisCommit) -> Result<CommitOutcome>;

    /// Create the generated contract, append the audit record and debit the
    /// balance, all or nothing.
    async fn commit_generation(&self, commit: GenerationCommit) -> Result<CommitOutcome>;
}
