//! Redis-backed manual request store
//!
//! Layout under `{prefix}:artifacts:{app_id}:manual_requests`:
//! - the key itself is a list of ids, newest at the head
//! - `{key}:{id}` holds the JSON document

use super::{new_id, ManualRequest, ManualRequestEntry, ManualRequestStore};
use crate::config::DocumentStoreConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use std::time::Duration;
use tracing::{debug, info};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Redis document store client
#[derive(Clone)]
pub struct RedisDocumentStore {
    connection: ConnectionManager,
    collection_key: String,
}

impl RedisDocumentStore {
    /// Connect to the configured Redis instance
    pub async fn connect(url: &str, config: &DocumentStoreConfig) -> Result<Self> {
        let client = Client::open(url).map_err(|e| AppError::DocumentStore {
            message: format!("Failed to create Redis client: {}", e),
        })?;

        let connection = tokio::time::timeout(CONNECT_TIMEOUT, ConnectionManager::new(client))
            .await
            .map_err(|_| AppError::DocumentStore {
                message: "Timed out connecting to Redis".to_string(),
            })?
            .map_err(|e| AppError::DocumentStore {
                message: format!("Failed to connect to Redis: {}", e),
            })?;

        let store = Self {
            connection,
            collection_key: collection_key(config),
        };
        info!(collection = %store.collection_key, "Document store connected");
        Ok(store)
    }

    fn document_key(&self, id: &str) -> String {
        format!("{}:{}", self.collection_key, id)
    }
}

/// Collection key for the manual requests of one application
pub fn collection_key(config: &DocumentStoreConfig) -> String {
    format!(
        "{}:artifacts:{}:manual_requests",
        config.key_prefix, config.app_id
    )
}

#[async_trait]
impl ManualRequestStore for RedisDocumentStore {
    fn backend_name(&self) -> &'static str {
        "redis"
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.connection.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| AppError::DocumentStore {
                message: format!("Redis ping failed: {}", e),
            })?;
        Ok(())
    }

    async fn submit(&self, request: ManualRequest) -> Result<ManualRequestEntry> {
        let entry = request.into_entry(new_id(), chrono::Utc::now());
        let json = serde_json::to_string(&entry)?;
        let doc_key = self.document_key(&entry.id);

        let mut conn = self.connection.clone();
        redis::pipe()
            .atomic()
            .set(&doc_key, &json)
            .lpush(&self.collection_key, &entry.id)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| AppError::DocumentStore {
                message: format!("Failed to store manual request: {}", e),
            })?;

        debug!(key = %doc_key, "Manual request stored");
        Ok(entry)
    }

    async fn list(&self) -> Result<Vec<ManualRequestEntry>> {
        let mut conn = self.connection.clone();

        let ids: Vec<String> = conn
            .lrange(&self.collection_key, 0, -1)
            .await
            .map_err(|e| AppError::DocumentStore {
                message: format!("Failed to read manual request index: {}", e),
            })?;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids.iter().map(|id| self.document_key(id)).collect();
        let documents: Vec<Option<String>> =
            conn.mget(&keys).await.map_err(|e| AppError::DocumentStore {
                message: format!("Failed to read manual requests: {}", e),
            })?;

        // Index entries whose document is gone are skipped
        documents
            .into_iter()
            .flatten()
            .map(|json| serde_json::from_str(&json).map_err(AppError::from))
            .collect()
    }
}
