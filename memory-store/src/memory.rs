use crate::store::MemoryStore;
use async_trait::async_trait;
use murmur_core::CoreError;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// Hash-map-backed store for tests and dry runs. Same upsert semantics
/// as the SQLite store, none of the durability.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<String, Value>>,
    connections: RwLock<HashSet<(String, String)>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn exists(&self, key: &str) -> Result<bool, CoreError> {
        Ok(self.records.read().await.contains_key(key))
    }

    async fn put(&self, key: &str, payload: &Value) -> Result<(), CoreError> {
        self.records
            .write()
            .await
            .insert(key.to_string(), payload.clone());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, CoreError> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn ensure_connection(
        &self,
        room_id: &str,
        participant_id: &str,
        _handle: &str,
    ) -> Result<(), CoreError> {
        self.connections
            .write()
            .await
            .insert((room_id.to_string(), participant_id.to_string()));
        Ok(())
    }
}
