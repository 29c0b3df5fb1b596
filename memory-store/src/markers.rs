use crate::store::MemoryStore;
use chrono::{DateTime, Utc};
use murmur_core::{CoreError, LastRunMarker};
use std::sync::Arc;
use tracing::debug;

/// Persisted last-run timestamps, one per scheduled activity scope, keyed
/// by `(agent_id, scope)` so co-located agents never clobber each other.
#[derive(Clone)]
pub struct MarkerStore {
    store: Arc<dyn MemoryStore>,
    agent_id: String,
}

impl MarkerStore {
    pub fn new(store: Arc<dyn MemoryStore>, agent_id: &str) -> Self {
        Self {
            store,
            agent_id: agent_id.to_string(),
        }
    }

    fn marker_key(&self, scope: &str) -> String {
        format!("marker:{}:{}", self.agent_id, scope)
    }

    pub async fn last_run(&self, scope: &str) -> Result<Option<DateTime<Utc>>, CoreError> {
        match self.store.get(&self.marker_key(scope)).await? {
            Some(payload) => {
                let marker: LastRunMarker = serde_json::from_value(payload)?;
                Ok(Some(marker.timestamp))
            }
            None => Ok(None),
        }
    }

    pub async fn record_run(&self, scope: &str, timestamp: DateTime<Utc>) -> Result<(), CoreError> {
        let marker = LastRunMarker {
            scope: scope.to_string(),
            timestamp,
        };
        let payload = serde_json::to_value(&marker)?;
        self.store.put(&self.marker_key(scope), &payload).await?;
        debug!("Recorded run of {} at {}", scope, timestamp);
        Ok(())
    }
}
