//! Manual request document store
//!
//! Provides:
//! - The `ManualRequestStore` abstraction
//! - A Redis-backed store (JSON documents plus a newest-first index list)
//! - An in-memory store for tests

mod memory;
mod redis_store;

pub use memory::MemoryDocumentStore;
pub use redis_store::RedisDocumentStore;

use crate::errors::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Status stamped on every new manual request
pub const STATUS_NEW: &str = "New";

/// Manual request as submitted
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ManualRequest {
    #[validate(length(min = 3, message = "subject must be at least 3 characters"))]
    pub subject: String,

    pub parties: String,

    pub description: String,

    pub outcome: String,
}

impl ManualRequest {
    /// Trim surrounding whitespace from every field
    pub fn normalized(self) -> Self {
        Self {
            subject: self.subject.trim().to_string(),
            parties: self.parties.trim().to_string(),
            description: self.description.trim().to_string(),
            outcome: self.outcome.trim().to_string(),
        }
    }

    /// Stamp id, status and time
    pub fn into_entry(self, id: String, created_at: DateTime<Utc>) -> ManualRequestEntry {
        ManualRequestEntry {
            id,
            subject: self.subject,
            parties: self.parties,
            description: self.description,
            outcome: self.outcome,
            status: STATUS_NEW.to_string(),
            created_at,
        }
    }
}

/// Stored manual request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualRequestEntry {
    pub id: String,
    pub subject: String,
    pub parties: String,
    pub description: String,
    pub outcome: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Persistence for manual requests
#[async_trait]
pub trait ManualRequestStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn ping(&self) -> Result<()>;

    /// Persist a new request and return its id
    async fn submit(&self, request: ManualRequest) -> Result<ManualRequestEntry>;

    /// All requests, newest first
    async fn list(&self) -> Result<Vec<ManualRequestEntry>>;
}

fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
