use crate::content::{normalize_newlines, split_into_chunks};
use crate::executor::OutboundRecord;
use generation_engine::{GenerationEngine, PromptContext};
use memory_store::MemoryStore;
use murmur_core::{processing_key, CoreError, PublishedPost};
use platform_client::{PlatformAdapter, WriteQueue};
use std::sync::Arc;
use tracing::{info, warn};

/// Composes and publishes a standalone post. Text longer than the
/// platform budget goes out as a chain, each piece replying to the one
/// before it. In dry-run mode the text is generated and logged but
/// nothing reaches the platform.
pub struct PostComposer {
    engine: Arc<dyn GenerationEngine>,
    adapter: Arc<dyn PlatformAdapter>,
    queue: WriteQueue,
    store: Arc<dyn MemoryStore>,
    agent_id: String,
    agent_name: String,
    max_post_chars: usize,
    dry_run: bool,
}

impl PostComposer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        engine: Arc<dyn GenerationEngine>,
        adapter: Arc<dyn PlatformAdapter>,
        queue: WriteQueue,
        store: Arc<dyn MemoryStore>,
        agent_id: &str,
        agent_name: &str,
        max_post_chars: usize,
        dry_run: bool,
    ) -> Self {
        Self {
            engine,
            adapter,
            queue,
            store,
            agent_id: agent_id.to_string(),
            agent_name: agent_name.to_string(),
            max_post_chars,
            dry_run,
        }
    }

    /// Returns the head of the published chain, or `None` in dry-run
    /// mode.
    pub async fn compose_and_publish(&self) -> Result<Option<PublishedPost>, CoreError> {
        let context = PromptContext::for_new_post(&self.agent_name);
        let raw = self.engine.generate_text(&context).await?;
        let text = normalize_newlines(&raw);
        let chunks = split_into_chunks(&text, self.max_post_chars);

        if self.dry_run {
            info!("Dry run, not publishing {} chunk(s): {}", chunks.len(), text);
            return Ok(None);
        }

        let mut head: Option<PublishedPost> = None;
        let mut previous_id: Option<String> = None;
        for chunk in chunks {
            let adapter = self.adapter.clone();
            let reply_to = previous_id.clone();
            let published = self
                .queue
                .submit("post", async move {
                    adapter.publish(&chunk, reply_to.as_deref()).await
                })
                .await?;
            info!("Published post {}", published.id);

            self.record_outbound(&published, previous_id.take()).await;
            previous_id = Some(published.id.clone());
            if head.is_none() {
                head = Some(published);
            }
        }
        Ok(head)
    }

    async fn record_outbound(&self, published: &PublishedPost, reply_to_id: Option<String>) {
        let record = OutboundRecord {
            post_id: published.id.clone(),
            text: published.text.clone(),
            reply_to_id,
            created_at: published.created_at,
        };
        let key = processing_key(&published.id, &self.agent_id);
        match serde_json::to_value(&record) {
            Ok(payload) => {
                if let Err(e) = self.store.put(&key, &payload).await {
                    warn!("Could not record outbound post {}: {}", published.id, e);
                }
            }
            Err(e) => warn!("Could not encode outbound post {}: {}", published.id, e),
        }
    }
}
