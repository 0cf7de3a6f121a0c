//! Contract CRUD and account views

use super::LegalServices;
use crate::db::models::{Contract, ContractStatus, ServiceRequest, UserProfile};
use crate::db::{ContractChanges, NewContract};
use crate::errors::{AppError, Result};
use tracing::info;
use uuid::Uuid;

/// Caller-supplied fields of a new contract
#[derive(Debug, Clone)]
pub struct ContractDraft {
    pub title: String,
    pub original_text: String,
}

fn not_found(contract_id: Uuid) -> AppError {
    AppError::ContractNotFound {
        id: contract_id.to_string(),
    }
}

impl LegalServices {
    pub async fn list_contracts(&self, owner_id: Uuid) -> Result<Vec<Contract>> {
        self.store.list_contracts(owner_id).await
    }

    /// Store an uploaded contract. The caller's profile is provisioned with
    /// the default balance on first use.
    pub async fn create_contract(&self, owner_id: Uuid, draft: ContractDraft) -> Result<Contract> {
        self.store
            .ensure_profile(
                owner_id,
                &self.billing.default_subscription,
                self.billing.default_tokens,
            )
            .await?;

        let contract = self
            .store
            .create_contract(
                owner_id,
                NewContract {
                    title: draft.title,
                    original_text: draft.original_text,
                    status: ContractStatus::Uploaded,
                },
            )
            .await?;

        info!(contract_id = %contract.id, owner_id = %owner_id, "Contract uploaded");
        Ok(contract)
    }

    pub async fn get_contract(&self, owner_id: Uuid, contract_id: Uuid) -> Result<Contract> {
        self.store
            .find_contract(owner_id, contract_id)
            .await?
            .ok_or_else(|| not_found(contract_id))
    }

    pub async fn update_contract(
        &self,
        owner_id: Uuid,
        contract_id: Uuid,
        changes: ContractChanges,
    ) -> Result<Contract> {
        self.store
            .update_contract(owner_id, contract_id, changes)
            .await?
            .ok_or_else(|| not_found(contract_id))
    }

    pub async fn archive_contract(&self, owner_id: Uuid, contract_id: Uuid) -> Result<Contract> {
        let changes = ContractChanges {
            status: Some(ContractStatus::Archived),
            ..ContractChanges::default()
        };
        self.update_contract(owner_id, contract_id, changes).await
    }

    pub async fn delete_contract(&self, owner_id: Uuid, contract_id: Uuid) -> Result<()> {
        if self.store.delete_contract(owner_id, contract_id).await? {
            info!(contract_id = %contract_id, owner_id = %owner_id, "Contract deleted");
            Ok(())
        } else {
            Err(not_found(contract_id))
        }
    }

    /// The caller's profile; it must already exist
    pub async fn profile(&self, owner_id: Uuid) -> Result<UserProfile> {
        self.store
            .find_profile(owner_id)
            .await?
            .ok_or_else(|| AppError::ProfileNotFound {
                user_id: owner_id.to_string(),
            })
    }

    pub async fn service_requests(&self, owner_id: Uuid) -> Result<Vec<ServiceRequest>> {
        self.store.list_service_requests(owner_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::harness;
    use super::*;
    use crate::llm::testing::ScriptedChatClient;

    fn draft(title: &str) -> ContractDraft {
        ContractDraft {
            title: title.to_string(),
            original_text: "Clause 1.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_provisions_profile_with_defaults() {
        let h = harness(ScriptedChatClient::default(), 0).await;
        let newcomer = Uuid::new_v4();

        assert!(matches!(
            h.services.profile(newcomer).await,
            Err(AppError::ProfileNotFound { .. })
        ));

        let contract = h.services.create_contract(newcomer, draft("Lease")).await.unwrap();
        assert_eq!(contract.contract_status(), ContractStatus::Uploaded);

        let profile = h.services.profile(newcomer).await.unwrap();
        assert_eq!(profile.tokens_remaining, 1000);
        assert_eq!(profile.subscription_level, "Basic");
    }

    #[tokio::test]
    async fn test_other_users_contract_is_not_found() {
        let h = harness(ScriptedChatClient::default(), 1000).await;
        let contract = h.services.create_contract(h.owner, draft("Lease")).await.unwrap();
        let stranger = Uuid::new_v4();

        assert!(matches!(
            h.services.get_contract(stranger, contract.id).await,
            Err(AppError::ContractNotFound { .. })
        ));
        assert!(matches!(
            h.services.archive_contract(stranger, contract.id).await,
            Err(AppError::ContractNotFound { .. })
        ));
        assert!(matches!(
            h.services.delete_contract(stranger, contract.id).await,
            Err(AppError::ContractNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_archive_and_update() {
        let h = harness(ScriptedChatClient::default(), 1000).await;
        let contract = h.services.create_contract(h.owner, draft("Lease")).await.unwrap();

        let renamed = h
            .services
            .update_contract(
                h.owner,
                contract.id,
                ContractChanges {
                    title: Some("Lease v2".to_string()),
                    ..ContractChanges::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.title, "Lease v2");
        assert_eq!(renamed.original_text, "Clause 1.");

        let archived = h.services.archive_contract(h.owner, contract.id).await.unwrap();
        assert_eq!(archived.contract_status(), ContractStatus::Archived);
    }
}
