use crate::content::{normalize_newlines, truncate_to_limit};
use chrono::{DateTime, Utc};
use generation_engine::{GenerationEngine, PromptContext};
use memory_store::{DedupCache, MemoryStore};
use murmur_core::{
    processing_key, ActionIntent, ActionKind, CoreError, Post, ProcessingRecord, PublishedPost,
};
use platform_client::{PlatformAdapter, WriteQueue};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What one pass over a single post actually did.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub post_id: String,
    pub intent: ActionIntent,
    pub completed: Vec<ActionKind>,
}

/// Durable trace of a post this agent published, keyed like any other
/// processed post so it deduplicates against its own timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct OutboundRecord {
    pub post_id: String,
    pub text: String,
    pub reply_to_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Carries a decided [`ActionIntent`] out against the platform. Each
/// enabled action runs independently: one failing action is logged and
/// skipped without disturbing the others, and the final record reflects
/// only what actually completed. All platform writes go through the
/// shared [`WriteQueue`].
pub struct ActionExecutor {
    adapter: Arc<dyn PlatformAdapter>,
    engine: Arc<dyn GenerationEngine>,
    queue: WriteQueue,
    dedup: Arc<DedupCache>,
    store: Arc<dyn MemoryStore>,
    agent_id: String,
    agent_name: String,
    max_post_chars: usize,
}

impl ActionExecutor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        adapter: Arc<dyn PlatformAdapter>,
        engine: Arc<dyn GenerationEngine>,
        queue: WriteQueue,
        dedup: Arc<DedupCache>,
        store: Arc<dyn MemoryStore>,
        agent_id: &str,
        agent_name: &str,
        max_post_chars: usize,
    ) -> Self {
        Self {
            adapter,
            engine,
            queue,
            dedup,
            store,
            agent_id: agent_id.to_string(),
            agent_name: agent_name.to_string(),
            max_post_chars,
        }
    }

    /// Execute every enabled action for `post`, then persist the
    /// processing record. The record write is the only failure that
    /// propagates; without it the post would be re-processed on the next
    /// sweep.
    pub async fn execute(
        &self,
        post: &Post,
        thread: &[Post],
        intent: ActionIntent,
    ) -> Result<ExecutionReport, CoreError> {
        let mut completed = Vec::new();

        for kind in intent.enabled() {
            let outcome = match kind {
                ActionKind::Like => self.run_like(post).await,
                ActionKind::Share => self.run_share(post).await,
                ActionKind::Quote => self.run_quote(post, thread).await,
                ActionKind::Reply => self.run_reply(post, thread).await,
            };
            match outcome {
                Ok(()) => {
                    info!("Executed {} on {}", kind, post.id);
                    completed.push(kind);
                }
                Err(e) => {
                    error!("Action {} on {} failed: {}", kind, post.id, e);
                }
            }
        }

        let record = ProcessingRecord::new(&post.id, &self.agent_id, completed.clone());
        self.dedup.mark_processed(&record).await?;

        Ok(ExecutionReport {
            post_id: post.id.clone(),
            intent,
            completed,
        })
    }

    async fn run_like(&self, post: &Post) -> Result<(), CoreError> {
        let adapter = self.adapter.clone();
        let id = post.id.clone();
        self.queue
            .submit("like", async move { adapter.like(&id).await })
            .await
    }

    async fn run_share(&self, post: &Post) -> Result<(), CoreError> {
        let adapter = self.adapter.clone();
        let id = post.id.clone();
        self.queue
            .submit("share", async move { adapter.share(&id).await })
            .await
    }

    async fn run_quote(&self, post: &Post, thread: &[Post]) -> Result<(), CoreError> {
        let text = self.compose_text(post, thread).await?;
        let adapter = self.adapter.clone();
        let id = post.id.clone();
        let published = self
            .queue
            .submit("quote", async move { adapter.quote(&text, &id).await })
            .await?;
        self.record_outbound(&published, None).await;
        Ok(())
    }

    async fn run_reply(&self, post: &Post, thread: &[Post]) -> Result<(), CoreError> {
        let text = self.compose_text(post, thread).await?;
        let adapter = self.adapter.clone();
        let parent_id = post.id.clone();
        let reply_to = parent_id.clone();
        let published = self
            .queue
            .submit("reply", async move {
                adapter.publish(&text, Some(&reply_to)).await
            })
            .await?;
        self.record_outbound(&published, Some(parent_id)).await;
        Ok(())
    }

    /// One generation round trip shaped for replying to `post`, trimmed
    /// to the platform budget.
    async fn compose_text(&self, post: &Post, thread: &[Post]) -> Result<String, CoreError> {
        let context = PromptContext::for_post(&self.agent_name, post, thread);
        let raw = self.engine.generate_text(&context).await?;
        let text = truncate_to_limit(&normalize_newlines(&raw), self.max_post_chars);
        debug!("Composed {} characters for {}", text.chars().count(), post.id);
        Ok(text)
    }

    /// Best effort: losing the outbound trace is survivable, losing the
    /// published post is not, so this never fails the action.
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
