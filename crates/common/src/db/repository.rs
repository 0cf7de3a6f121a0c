//! Repository pattern for database operations
//!
//! SeaORM implementation of [`ContractStore`]. Paid operations run inside a
//! single transaction so the contract, the audit record and the balance move
//! together.

use crate::db::models::*;
use crate::db::store::{
    AnalysisCommit, CommitOutcome, ContractChanges, ContractStore, GenerationCommit, NewContract,
};
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }
}

/// Subtract `tokens` from the balance in place. No lower bound is applied.
async fn debit_tokens<C: ConnectionTrait>(conn: &C, user_id: Uuid, tokens: i32) -> Result<UserProfile> {
    let result = UserProfileEntity::update_many()
        .col_expr(
            UserProfileColumn::TokensRemaining,
            Expr::col(UserProfileColumn::TokensRemaining).sub(tokens),
        )
        .filter(UserProfileColumn::UserId.eq(user_id))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::ProfileNotFound {
            user_id: user_id.to_string(),
        });
    }

    UserProfileEntity::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::ProfileNotFound {
            user_id: user_id.to_string(),
        })
}

async fn record_service_request<C: ConnectionTrait>(
    conn: &C,
    owner_id: Uuid,
    contract_id: Uuid,
    service_type: ServiceType,
    tokens_used: i32,
) -> Result<ServiceRequest> {
    ServiceRequestActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(owner_id),
        related_contract_id: Set(Some(contract_id)),
        service_type: Set(service_type.into()),
        tokens_used: Set(tokens_used),
        is_paid: Set(true),
        request_timestamp: Set(chrono::Utc::now().into()),
    }
    .insert(conn)
    .await
    .map_err(Into::into)
}

#[async_trait]
impl ContractStore for Repository {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    async fn list_contracts(&self, owner_id: Uuid) -> Result<Vec<Contract>> {
        ContractEntity::find()
            .filter(ContractColumn::OwnerId.eq(owner_id))
            .order_by_desc(ContractColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn create_contract(&self, owner_id: Uuid, contract: NewContract) -> Result<Contract> {
        let now = chrono::Utc::now();

        ContractActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(owner_id),
            title: Set(contract.title),
            original_text: Set(contract.original_text),
            status: Set(contract.status.into()),
            analysis_results: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(self.write_conn())
        .await
        .map_err(Into::into)
    }

    async fn find_contract(&self, owner_id: Uuid, contract_id: Uuid) -> Result<Option<Contract>> {
        ContractEntity::find_by_id(contract_id)
            .filter(ContractColumn::OwnerId.eq(owner_id))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn update_contract(
        &self,
        owner_id: Uuid,
        contract_id: Uuid,
        changes: ContractChanges,
    ) -> Result<Option<Contract>> {
        let Some(existing) = ContractEntity::find_by_id(contract_id)
            .filter(ContractColumn::OwnerId.eq(owner_id))
            .one(self.write_conn())
            .await?
        else {
            return Ok(None);
        };

        if changes.is_empty() {
            return Ok(Some(existing));
        }

        let mut contract: ContractActiveModel = existing.into();
        if let Some(title) = changes.title {
            contract.title = Set(title);
        }
        if let Some(text) = changes.original_text {
            contract.original_text = Set(text);
        }
        if let Some(status) = changes.status {
            contract.status = Set(status.into());
        }
        contract.updated_at = Set(chrono::Utc::now().into());

        contract.update(self.write_conn()).await.map(Some).map_err(Into::into)
    }

    async fn delete_contract(&self, owner_id: Uuid, contract_id: Uuid) -> Result<bool> {
        // service_requests.related_contract_id is ON DELETE SET NULL
        let result = ContractEntity::delete_many()
            .filter(ContractColumn::Id.eq(contract_id))
            .filter(ContractColumn::OwnerId.eq(owner_id))
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        UserProfileEntity::find_by_id(user_id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn ensure_profile(
        &self,
        user_id: Uuid,
        subscription_level: &str,
        tokens: i32,
    ) -> Result<UserProfile> {
        let profile = UserProfileActiveModel {
            user_id: Set(user_id),
            subscription_level: Set(subscription_level.to_string()),
            tokens_remaining: Set(tokens),
        };

        UserProfileEntity::insert(profile)
            .on_conflict(
                OnConflict::column(UserProfileColumn::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.write_conn())
            .await?;

        UserProfileEntity::find_by_id(user_id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::ProfileNotFound {
                user_id: user_id.to_string(),
            })
    }

    async fn list_service_requests(&self, owner_id: Uuid) -> Result<Vec<ServiceRequest>> {
        ServiceRequestEntity::find()
            .filter(ServiceRequestColumn::OwnerId.eq(owner_id))
            .order_by_desc(ServiceRequestColumn::RequestTimestamp)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn verified_clauses(&self, category: ClauseCategory) -> Result<Vec<KnowledgeBaseClause>> {
        KnowledgeBaseClauseEntity::find()
            .filter(KnowledgeBaseClauseColumn::ClauseType.eq(category.as_str()))
            .filter(KnowledgeBaseClauseColumn::IsVerified.eq(true))
            .order_by_asc(KnowledgeBaseClauseColumn::Title)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn commit_analysis(&self, commit: AnalysisCommit) -> Result<CommitOutcome> {
        let txn = self.write_conn().begin().await?;

        let existing = ContractEntity::find_by_id(commit.contract_id)
            .filter(ContractColumn::OwnerId.eq(commit.owner_id))
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::ContractNotFound {
                id: commit.contract_id.to_string(),
            })?;

        let mut contract: ContractActiveModel = existing.into();
        contract.status = Set(ContractStatus::AnalysisComplete.into());
        contract.analysis_results = Set(Some(commit.results));
        contract.updated_at = Set(chrono::Utc::now().into());
        let contract = contract.update(&txn).await?;

        let service_request = record_service_request(
            &txn,
            commit.owner_id,
            contract.id,
            ServiceType::Analyze,
            commit.tokens_used,
        )
        .await?;

        // Any error above drops the transaction, which rolls it back
        let profile = debit_tokens(&txn, commit.owner_id, commit.tokens_used).await?;

        txn.commit().await?;

        Ok(CommitOutcome {
            contract,
            service_request,
            profile,
        })
    }

    async fn commit_generation(&self, commit: GenerationCommit) -> Result<CommitOutcome> {
        let txn = self.write_conn().begin().await?;
        let now = chrono::Utc::now();

        let contract = ContractActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(commit.owner_id),
            title: Set(commit.title),
            original_text: Set(commit.contract_text),
            status: Set(ContractStatus::Generated.into()),
            analysis_results: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        let service_request = record_service_request(
            &txn,
            commit.owner_id,
            contract.id,
            ServiceType::Generate,
            commit.tokens_used,
        )
        .await?;

        let profile = debit_tokens(&txn, commit.owner_id, commit.tokens_used).await?;

        txn.commit().await?;

        Ok(CommitOutcome {
            contract,
            service_request,
            profile,
        })
    }
}
