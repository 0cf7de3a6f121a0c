//! In-memory [`ContractStore`] for local demos and tests.
//!
//! A single `RwLock` guards all tables, so the paid-call commits are atomic
//! with respect to every other operation on the store.

use crate::db::models::*;
use crate::db::store::{
    AnalysisCommit, CommitOutcome, ContractChanges, ContractStore, GenerationCommit, NewContract,
};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    contracts: Vec<Contract>,
    service_requests: Vec<ServiceRequest>,
    profiles: HashMap<Uuid, UserProfile>,
    clauses: Vec<KnowledgeBaseClause>,
}

impl Tables {
    fn contract_index(&self, owner_id: Uuid, contract_id: Uuid) -> Option<usize> {
        self.contracts
            .iter()
            .position(|c| c.id == contract_id && c.owner_id == owner_id)
    }

    fn push_service_request(
        &mut self,
        owner_id: Uuid,
        contract_id: Uuid,
        service_type: ServiceType,
        tokens_used: i32,
    ) -> ServiceRequest {
        let record = ServiceRequest {
            id: Uuid::new_v4(),
            owner_id,
            related_contract_id: Some(contract_id),
            service_type: service_type.into(),
            tokens_used,
            is_paid: true,
            request_timestamp: chrono::Utc::now().into(),
        };
        self.service_requests.push(record.clone());
        record
    }
}

/// Store backed by process memory
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with a knowledge base
    pub fn with_clauses(clauses: Vec<KnowledgeBaseClause>) -> Self {
        Self {
            tables: RwLock::new(Tables {
                clauses,
                ..Tables::default()
            }),
        }
    }

    /// Create or overwrite a profile
    pub async fn put_profile(&self, profile: UserProfile) {
        self.tables
            .write()
            .await
            .profiles
            .insert(profile.user_id, profile);
    }
}

/// Newest first, ties broken by reverse insertion order
fn newest_first<T: Clone>(items: &[T], key: impl Fn(&T) -> DateTimeWithTimeZone) -> Vec<T> {
    let mut out: Vec<T> = items.iter().rev().cloned().collect();
    out.sort_by(|a, b| key(b).cmp(&key(a)));
    out
}

#[async_trait]
impl ContractStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn list_contracts(&self, owner_id: Uuid) -> Result<Vec<Contract>> {
        let tables = self.tables.read().await;
        let owned: Vec<Contract> = tables
            .contracts
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(newest_first(&owned, |c| c.created_at))
    }

    async fn create_contract(&self, owner_id: Uuid, contract: NewContract) -> Result<Contract> {
        let now = chrono::Utc::now();
        let record = Contract {
            id: Uuid::new_v4(),
            owner_id,
            title: contract.title,
            original_text: contract.original_text,
            status: contract.status.into(),
            analysis_results: None,
            created_at: now.into(),
            updated_at: now.into(),
        };

        self.tables.write().await.contracts.push(record.clone());
        Ok(record)
    }

    async fn find_contract(&self, owner_id: Uuid, contract_id: Uuid) -> Result<Option<Contract>> {
        let tables = self.tables.read().await;
        Ok(tables
            .contract_index(owner_id, contract_id)
            .map(|i| tables.contracts[i].clone()))
    }

    async fn update_contract(
        &self,
        owner_id: Uuid,
        contract_id: Uuid,
        changes: ContractChanges,
    ) -> Result<Option<Contract>> {
        let mut tables = self.tables.write().await;
        let Some(index) = tables.contract_index(owner_id, contract_id) else {
            return Ok(None);
        };

        let contract = &mut tables.contracts[index];
        if changes.is_empty() {
            return Ok(Some(contract.clone()));
        }
        if let Some(title) = changes.title {
            contract.title = title;
        }
        if let Some(text) = changes.original_text {
            contract.original_text = text;
        }
        if let Some(status) = changes.status {
            contract.status = status.into();
        }
        contract.updated_at = chrono::Utc::now().into();

        Ok(Some(contract.clone()))
    }

    async fn delete_contract(&self, owner_id: Uuid, contract_id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let Some(index) = tables.contract_index(owner_id, contract_id) else {
            return Ok(false);
        };

        tables.contracts.remove(index);
        for record in tables.service_requests.iter_mut() {
            if record.related_contract_id == Some(contract_id) {
                record.related_contract_id = None;
            }
        }
        Ok(true)
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        Ok(self.tables.read().await.profiles.get(&user_id).cloned())
    }

    async fn ensure_profile(
        &self,
        user_id: Uuid,
        subscription_level: &str,
        tokens: i32,
    ) -> Result<UserProfile> {
        let mut tables = self.tables.write().await;
        let profile = tables
            .profiles
            .entry(user_id)
            .or_insert_with(|| UserProfile {
                user_id,
                subscription_level: subscription_level.to_string(),
                tokens_remaining: tokens,
            });
        Ok(profile.clone())
    }

    async fn list_service_requests(&self, owner_id: Uuid) -> Result<Vec<ServiceRequest>> {
        let tables = self.tables.read().await;
        let owned: Vec<ServiceRequest> = tables
            .service_requests
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(newest_first(&owned, |r| r.request_timestamp))
    }

    async fn verified_clauses(&self, category: ClauseCategory) -> Result<Vec<KnowledgeBaseClause>> {
        let tables = self.tables.read().await;
        let mut clauses: Vec<KnowledgeBaseClause> = tables
            .clauses
            .iter()
            .filter(|c| c.is_verified && c.clause_type == category.as_str())
            .cloned()
            .collect();
        clauses.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(clauses)
    }

    async fn commit_analysis(&self, commit: AnalysisCommit) -> Result<CommitOutcome> {
        let mut tables = self.tables.write().await;

        // Validate before touching anything so a failure leaves no trace
        let index = tables
            .contract_index(commit.owner_id, commit.contract_id)
            .ok_or_else(|| AppError::ContractNotFound {
                id: commit.contract_id.to_string(),
            })?;
        if !tables.profiles.contains_key(&commit.owner_id) {
            return Err(AppError::ProfileNotFound {
                user_id: commit.owner_id.to_string(),
            });
        }

        let contract = {
            let contract = &mut tables.contracts[index];
            contract.status = ContractStatus::AnalysisComplete.into();
            contract.analysis_results = Some(commit.results);
            contract.updated_at = chrono::Utc::now().into();
            contract.clone()
        };

        let service_request = tables.push_service_request(
            commit.owner_id,
            contract.id,
            ServiceType::Analyze,
            commit.tokens_used,
        );

        let profile = tables
            .profiles
            .get_mut(&commit.owner_id)
            .map(|p| {
                p.tokens_remaining -= commit.tokens_used;
                p.clone()
            })
            .ok_or_else(|| AppError::ProfileNotFound {
                user_id: commit.owner_id.to_string(),
            })?;

        Ok(CommitOutcome {
            contract,
            service_request,
            profile,
        })
    }

    async fn commit_generation(&self, commit: GenerationCommit) -> Result<CommitOutcome> {
        let mut tables = self.tables.write().await;

        if !tables.profiles.contains_key(&commit.owner_id) {
            return Err(AppError::ProfileNotFound {
                user_id: commit.owner_id.to_string(),
            });
        }

        let now = chrono::Utc::now();
        let contract = Contract {
            id: Uuid::new_v4(),
            owner_id: commit.owner_id,
            title: commit.title,
            original_text: commit.contract_text,
            status: ContractStatus::Generated.into(),
            analysis_results: None,
            created_at: now.into(),
            updated_at: now.into(),
        };
        tables.contracts.push(contract.clone());

        let service_request = tables.push_service_request(
            commit.owner_id,
            contract.id,
            ServiceType::Generate,
            commit.tokens_used,
        );

        let profile = tables
            .profiles
            .get_mut(&commit.owner_id)
            .map(|p| {
                p.tokens_remaining -= commit.tokens_used;
                p.clone()
            })
            .ok_or_else(|| AppError::ProfileNotFound {
                user_id: commit.owner_id.to_string(),
            })?;

        Ok(CommitOutcome {
            contract,
            service_request,
            profile,
        })
    }
}

/// A small verified knowledge base used when running against memory
pub fn sample_clauses() -> Vec<KnowledgeBaseClause> {
    let clause = |title: &str, category: ClauseCategory, text: &str, verified: bool| {
        KnowledgeBaseClause {
            id: Uuid::new_v4(),
            title: title.to_string(),
            clause_type: category.as_str().to_string(),
            text_content: text.to_string(),
            is_verified: verified,
        }
    };

    vec![
        clause(
            "Governing Law",
            ClauseCategory::General,
            "This Agreement shall be governed by and construed in accordance with the laws of the jurisdiction stated above.",
            true,
        ),
        clause(
            "Dispute Resolution",
            ClauseCategory::General,
            "Any dispute arising out of this Agreement shall first be referred to good-faith negotiation and then to binding arbitration.",
            true,
        ),
        clause(
            "Probation Period",
            ClauseCategory::Employment,
            "The Employee shall serve a probation period of ninety (90) days during which either party may terminate with seven days notice.",
            true,
        ),
        clause(
            "Termination Notice",
            ClauseCategory::Employment,
            "After the probation period, either party may terminate this employment by giving thirty (30) days written notice.",
            true,
        ),
        clause(
            "Rent Payment",
            ClauseCategory::Rental,
            "The Tenant shall pay the monthly rent in advance no later than the fifth day of each calendar month.",
            true,
        ),
        clause(
            "Security Deposit",
            ClauseCategory::Rental,
            "The Tenant shall pay a security deposit equal to one month of rent, refundable within thirty days after the lease ends.",
            true,
        ),
        clause(
            "Confidential Information",
            ClauseCategory::Nda,
            "Confidential Information means all non-public business, technical and financial information disclosed by either party.",
            true,
        ),
        clause(
            "Draft Non-compete",
            ClauseCategory::Nda,
            "The Receiving Party shall not compete with the Disclosing Party for five years worldwide.",
            false,
        ),
    ]
}
