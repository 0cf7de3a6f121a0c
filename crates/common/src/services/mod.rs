//! Business workflows shared by the HTTP layer
//!
//! - Contract CRUD scoped to the caller
//! - Knowledge base retrieval
//! - Paid analysis and generation with admission control and atomic commit

mod admission;
mod analysis;
mod clauses;
mod contracts;
mod generation;

pub use admission::AdmissionPolicy;
pub use clauses::{render_clauses, select_clauses, RetrievedClauses};
pub use contracts::ContractDraft;
pub use generation::{GenerationReport, GenerationRequest};

use crate::config::BillingConfig;
use crate::db::ContractStore;
use crate::llm::LlmGateway;
use std::sync::Arc;

/// Process-wide service handle, cheap to clone
#[derive(Clone)]
pub struct LegalServices {
    store: Arc<dyn ContractStore>,
    llm: Arc<LlmGateway>,
    billing: BillingConfig,
    admission: AdmissionPolicy,
}

impl LegalServices {
    pub fn new(store: Arc<dyn ContractStore>, llm: Arc<LlmGateway>, billing: BillingConfig) -> Self {
        let admission = AdmissionPolicy::new(billing.estimated_analysis_cost);
        Self {
            store,
            llm,
            billing,
            admission,
        }
    }

    pub fn store(&self) -> &Arc<dyn ContractStore> {
        &self.store
    }

    pub fn llm(&self) -> &LlmGateway {
        &self.llm
    }

    pub fn admission(&self) -> AdmissionPolicy {
        self.admission
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::db::models::UserProfile;
    use crate::db::MemoryStore;
    use crate::llm::testing::ScriptedChatClient;
    use crate::llm::ChatClient;
    use uuid::Uuid;

    pub struct Harness {
        pub services: LegalServices,
        pub store: Arc<MemoryStore>,
        pub client: Arc<ScriptedChatClient>,
        pub owner: Uuid,
    }

    /// Services over a memory store, with `tokens` on the caller's balance
    pub async fn harness(client: ScriptedChatClient, tokens: i32) -> Harness {
        let store = Arc::new(MemoryStore::with_clauses(crate::db::sample_clauses()));
        let client = Arc::new(client);
        let owner = Uuid::new_v4();

        store
            .put_profile(UserProfile {
                user_id: owner,
                subscription_level: "Basic".to_string(),
                tokens_remaining: tokens,
            })
            .await;

        let llm = LlmGateway::new(Some(client.clone() as Arc<dyn ChatClient>), "gpt-4-turbo");
        let services = LegalServices::new(
            store.clone() as Arc<dyn ContractStore>,
            Arc::new(llm),
            BillingConfig::default(),
        );

        Harness {
            services,
            store,
            client,
            owner,
        }
    }
}
