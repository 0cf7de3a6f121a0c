use super::{new_id, ManualRequest, ManualRequestEntry, ManualRequestStore};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// In-memory manual request store
#[derive(Default)]
pub struct MemoryDocumentStore {
    entries: RwLock<Vec<ManualRequestEntry>>,
    failing: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail, as an unreachable store would
    pub fn fail_operations(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::DocumentStore {
                message: "document store unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ManualRequestStore for MemoryDocumentStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        self.check()
    }

    async fn submit(&self, request: ManualRequest) -> Result<ManualRequestEntry> {
        self.check()?;
        let entry = request.into_entry(new_id(), chrono::Utc::now());
        self.entries.write().await.insert(0, entry.clone());
        Ok(entry)
    }

    async fn list(&self) -> Result<Vec<ManualRequestEntry>> {
        self.check()?;
        Ok(self.entries.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(subject: &str) -> ManualRequest {
        ManualRequest {
            subject: subject.to_string(),
            parties: "B".to_string(),
            description: "C".to_string(),
            outcome: "D".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = MemoryDocumentStore::new();
        let first = store.submit(request("first")).await.unwrap();
        let second = store.submit(request("second")).await.unwrap();

        let ids: Vec<String> = store.list().await.unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_failing_store_reports_errors() {
        let store = MemoryDocumentStore::new();
        store.fail_operations(true);
        assert!(store.submit(request("subject")).await.is_err());
        assert!(store.list().await.is_err());
    }
}
