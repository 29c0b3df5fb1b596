use crate::store::MemoryStore;
use murmur_core::{CoreError, ProcessingRecord};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Answers "have we already processed this key" and records outcomes.
/// Keeps an in-memory mirror for hot lookups; the durable store stays the
/// source of truth, so a restart never forgets prior dedup state.
pub struct DedupCache {
    store: Arc<dyn MemoryStore>,
    seen: RwLock<HashSet<String>>,
}

impl DedupCache {
    pub fn new(store: Arc<dyn MemoryStore>) -> Self {
        Self {
            store,
            seen: RwLock::new(HashSet::new()),
        }
    }

    pub async fn has_processed(&self, key: &str) -> Result<bool, CoreError> {
        if self.seen.read().await.contains(key) {
            return Ok(true);
        }
        let known = self.store.exists(key).await?;
        if known {
            self.seen.write().await.insert(key.to_string());
        }
        Ok(known)
    }

    /// Idempotent upsert: a repeat write for the same key replaces the
    /// payload rather than failing. Callers guarantee no duplicate action
    /// execution by checking `has_processed` before acting.
    pub async fn mark_processed(&self, record: &ProcessingRecord) -> Result<(), CoreError> {
        let payload = serde_json::to_value(record)?;
        self.store.put(&record.key, &payload).await?;
        self.seen.write().await.insert(record.key.clone());
        debug!(
            "Marked {} processed with {} executed actions",
            record.key,
            record.executed_actions.len()
        );
        Ok(())
    }

    pub async fn get_record(&self, key: &str) -> Result<Option<ProcessingRecord>, CoreError> {
        match self.store.get(key).await? {
            Some(payload) => Ok(Some(serde_json::from_value(payload)?)),
            None => Ok(None),
        }
    }
}
