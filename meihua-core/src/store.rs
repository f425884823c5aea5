//! Persistence seam for divination results.
//!
//! The engine never persists anything itself. Callers that keep a history
//! hand results to a [`DivinationStore`]; the store assigns the record id and
//! timestamp.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::engine::DivinationResult;

/// Errors from a divination store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Divination not found: {0}")]
    NotFound(Uuid),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// A persisted divination.
#[derive(Debug, Clone, Serialize)]
pub struct StoredDivination {
    pub id: Uuid,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub result: DivinationResult,
    /// LLM narrative, attached after the fact
    pub narrative: Option<String>,
}

/// Storage backend for divination history.
#[async_trait]
pub trait DivinationStore: Send + Sync {
    /// Persist a result for `owner_id`.
    async fn save(&self, owner_id: &str, result: DivinationResult) -> Result<StoredDivination, StoreError>;

    async fn get(&self, id: Uuid) -> Result<StoredDivination, StoreError>;

    /// Most recent records for an owner, newest first.
    async fn history(&self, owner_id: &str, limit: usize) -> Result<Vec<StoredDivination>, StoreError>;

    async fn attach_narrative(&self, id: Uuid, narrative: String) -> Result<StoredDivination, StoreError>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: DashMap<Uuid, StoredDivination>,
    /// Record ids per owner, in insertion order
    by_owner: DashMap<String, Vec<Uuid>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl DivinationStore for InMemoryStore {
    async fn save(&self, owner_id: &str, result: DivinationResult) -> Result<StoredDivination, StoreError> {
        let record = StoredDivination {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            created_at: Utc::now(),
            result,
            narrative: None,
        };

        self.records.insert(record.id, record.clone());
        self.by_owner
            .entry(owner_id.to_string())
            .or_default()
            .push(record.id);

        info!(id = %record.id, owner_id, "Divination saved");
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<StoredDivination, StoreError> {
        self.records
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or(StoreError::NotFound(id))
    }

    async fn history(&self, owner_id: &str, limit: usize) -> Result<Vec<StoredDivination>, StoreError> {
        let Some(ids) = self.by_owner.get(owner_id) else {
            return Ok(Vec::new());
        };

        let records: Vec<StoredDivination> = ids
            .iter()
            .rev()
            .filter_map(|id| self.records.get(id).map(|r| r.value().clone()))
            .take(limit)
            .collect();

        debug!(owner_id, count = records.len(), "History read");
        Ok(records)
    }

    async fn attach_narrative(&self, id: Uuid, narrative: String) -> Result<StoredDivination, StoreError> {
        let mut record = self.records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        record.narrative = Some(narrative);
        debug!(id = %id, "Narrative attached");
        Ok(record.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derivation::DivinationParams;
    use crate::engine::DivinationEngine;

    fn result(first: u32, second: u32) -> DivinationResult {
        DivinationEngine::new()
            .perform_divination("问", "number", &DivinationParams::numbers(first, second))
            .unwrap()
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let store = InMemoryStore::new();
        let saved = store.save("user-1", result(9, 17)).await.unwrap();

        let loaded = store.get(saved.id).await.unwrap();
        assert_eq!(loaded.owner_id, "user-1");
        assert_eq!(loaded.result.primary.id, 1);
        assert!(loaded.narrative.is_none());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_history_newest_first() {
        let store = InMemoryStore::new();
        let first = store.save("user-1", result(1, 2)).await.unwrap();
        let second = store.save("user-1", result(3, 4)).await.unwrap();
        let third = store.save("user-1", result(5, 6)).await.unwrap();
        store.save("user-2", result(7, 8)).await.unwrap();

        let history = store.history("user-1", 10).await.unwrap();
        let ids: Vec<Uuid> = history.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);

        let limited = store.history("user-1", 2).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].id, third.id);

        assert!(store.history("nobody", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_attach_narrative() {
        let store = InMemoryStore::new();
        let saved = store.save("user-1", result(9, 17)).await.unwrap();

        let updated = store
            .attach_narrative(saved.id, "## 卦象总体含义".to_string())
            .await
            .unwrap();
        assert_eq!(updated.narrative.as_deref(), Some("## 卦象总体含义"));
        assert!(store.get(saved.id).await.unwrap().narrative.is_some());
    }

    #[tokio::test]
    async fn test_missing_record() {
        let store = InMemoryStore::new();
        let id = Uuid::new_v4();
        assert_eq!(store.get(id).await.unwrap_err(), StoreError::NotFound(id));
        assert!(store.attach_narrative(id, "x".to_string()).await.is_err());
    }
}
