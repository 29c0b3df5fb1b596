use async_trait::async_trait;
use murmur_core::CoreError;
use serde_json::Value;

/// Append-only keyed record store. The pipeline's single source of truth
/// for dedup state, processed-post history and scheduling markers; a
/// process restart must not forget anything written here.
///
/// `put` is an idempotent upsert: writing the same key twice keeps the
/// newest payload. At-most-once action execution is enforced above this
/// interface by checking `exists` before acting, never by failing the
/// write.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    async fn exists(&self, key: &str) -> Result<bool, CoreError>;

    async fn put(&self, key: &str, payload: &Value) -> Result<(), CoreError>;

    async fn get(&self, key: &str) -> Result<Option<Value>, CoreError>;

    /// Conversational bookkeeping: make sure a room exists and the
    /// participant is linked to it. Called as a side effect while
    /// reconstructing threads.
    async fn ensure_connection(
        &self,
        room_id: &str,
        participant_id: &str,
        handle: &str,
    ) -> Result<(), CoreError>;
}
