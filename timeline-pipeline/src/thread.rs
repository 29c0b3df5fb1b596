use memory_store::MemoryStore;
use murmur_core::{processing_key, room_key, ConversationThread, Post, ProcessingRecord};
use platform_client::PlatformAdapter;
use std::collections::HashSet;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

/// Rebuilds the reply chain above a timeline post by walking
/// `reply_to_id` links upward, bounded by `max_depth` parent fetches.
/// Reconstruction is best-effort and infallible: a missing parent, a
/// fetch error or a reply cycle ends the walk with whatever was
/// collected so far.
pub struct ThreadReconstructor {
    adapter: Arc<dyn PlatformAdapter>,
    store: Arc<dyn MemoryStore>,
    agent_id: String,
    max_depth: usize,
}

impl ThreadReconstructor {
    pub fn new(
        adapter: Arc<dyn PlatformAdapter>,
        store: Arc<dyn MemoryStore>,
        agent_id: &str,
        max_depth: usize,
    ) -> Self {
        Self {
            adapter,
            store,
            agent_id: agent_id.to_string(),
            max_depth,
        }
    }

    /// Returns the conversation oldest-first, leaf last. The leaf itself
    /// never counts against the depth bound; only parent fetches do.
    ///
    /// Only ancestors get a context record here. The leaf stays
    /// unrecorded until the executor marks it, so a failure anywhere
    /// before execution leaves the post eligible for the next sweep.
    pub async fn build_thread(&self, leaf: &Post) -> ConversationThread {
        let mut thread: VecDeque<Post> = VecDeque::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut current = leaf.clone();
        let mut hops = 0usize;

        loop {
            if !visited.insert(current.id.clone()) {
                warn!("Reply cycle detected at {}, stopping walk", current.id);
                break;
            }
            if current.id != leaf.id {
                self.record_visit(&current).await;
            }
            thread.push_front(current.clone());

            let Some(parent_id) = current.reply_to_id.clone() else {
                break;
            };
            if hops >= self.max_depth {
                debug!(
                    "Thread depth bound {} reached at {}, keeping partial chain",
                    self.max_depth, current.id
                );
                break;
            }

            match self.adapter.fetch_post(&parent_id).await {
                Ok(Some(parent)) => {
                    hops += 1;
                    current = parent;
                }
                Ok(None) => {
                    debug!("Parent {} not found, chain ends here", parent_id);
                    break;
                }
                Err(e) => {
                    warn!("Failed to fetch parent {}: {}", parent_id, e);
                    break;
                }
            }
        }

        debug!(
            "Reconstructed thread of {} posts for {}",
            thread.len(),
            leaf.id
        );
        thread.into()
    }

    /// Persist that this ancestor was seen as conversation context and
    /// link its author into the conversation room. Failures here are
    /// logged and swallowed; bookkeeping must never abort
    /// reconstruction.
    async fn record_visit(&self, post: &Post) {
        let key = processing_key(&post.id, &self.agent_id);
        match self.store.exists(&key).await {
            Ok(true) => return,
            Ok(false) => {}
            Err(e) => {
                warn!("Could not check visit record for {}: {}", post.id, e);
                return;
            }
        }

        let room = room_key(&post.conversation_id, &self.agent_id);
        if let Err(e) = self
            .store
            .ensure_connection(&room, &post.author_id, &post.author_id)
            .await
        {
            warn!("Could not link {} into {}: {}", post.author_id, room, e);
        }

        let record = ProcessingRecord::context_only(&post.id, &self.agent_id);
        match serde_json::to_value(&record) {
            Ok(payload) => {
                if let Err(e) = self.store.put(&key, &payload).await {
                    warn!("Could not persist visit record for {}: {}", post.id, e);
                }
            }
            Err(e) => warn!("Could not encode visit record for {}: {}", post.id, e),
        }
    }
}
