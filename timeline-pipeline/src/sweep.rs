use crate::executor::{ActionExecutor, ExecutionReport};
use crate::thread::ThreadReconstructor;
use generation_engine::{GenerationEngine, PromptContext};
use memory_store::DedupCache;
use murmur_core::{processing_key, CoreError};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Tally of one timeline pass.
#[derive(Debug, Clone, Default)]
pub struct SweepOutcome {
    pub fetched: usize,
    pub skipped_duplicates: usize,
    pub processed: Vec<ExecutionReport>,
}

/// One full pass over the home timeline: fetch, drop already-processed
/// posts, rebuild each thread, ask the engine what to do, execute.
/// Every per-post failure is contained to that post; only the timeline
/// fetch itself can fail the sweep.
pub struct TimelineSweep {
    adapter: Arc<dyn platform_client::PlatformAdapter>,
    engine: Arc<dyn GenerationEngine>,
    reconstructor: Arc<ThreadReconstructor>,
    executor: Arc<ActionExecutor>,
    dedup: Arc<DedupCache>,
    agent_id: String,
    agent_name: String,
    fetch_limit: usize,
}

impl TimelineSweep {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        adapter: Arc<dyn platform_client::PlatformAdapter>,
        engine: Arc<dyn GenerationEngine>,
        reconstructor: Arc<ThreadReconstructor>,
        executor: Arc<ActionExecutor>,
        dedup: Arc<DedupCache>,
        agent_id: &str,
        agent_name: &str,
        fetch_limit: usize,
    ) -> Self {
        Self {
            adapter,
            engine,
            reconstructor,
            executor,
            dedup,
            agent_id: agent_id.to_string(),
            agent_name: agent_name.to_string(),
            fetch_limit,
        }
    }

    pub async fn run(&self) -> Result<SweepOutcome, CoreError> {
        let timeline = self.adapter.fetch_timeline(self.fetch_limit).await?;
        let mut outcome = SweepOutcome {
            fetched: timeline.len(),
            ..Default::default()
        };
        debug!("Fetched {} timeline posts", outcome.fetched);

        for post in &timeline {
            let key = processing_key(&post.id, &self.agent_id);
            match self.dedup.has_processed(&key).await {
                Ok(true) => {
                    outcome.skipped_duplicates += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    // Cannot prove the post was not already handled, so
                    // err on the side of silence.
                    warn!("Dedup check failed for {}, skipping: {}", post.id, e);
                    continue;
                }
            }

            let thread = self.reconstructor.build_thread(post).await;
            let context = PromptContext::for_post(&self.agent_name, post, &thread);

            let intent = match self.engine.decide_actions(&context).await {
                Ok(intent) => intent,
                Err(e) => {
                    warn!("Action decision failed for {}: {}", post.id, e);
                    continue;
                }
            };
            if intent.is_empty() {
                debug!("No actions chosen for {}", post.id);
                continue;
            }

            match self.executor.execute(post, &thread, intent).await {
                Ok(report) => outcome.processed.push(report),
                Err(e) => error!("Execution failed for {}: {}", post.id, e),
            }
        }

        info!(
            "Timeline sweep done: {} fetched, {} duplicates, {} processed",
            outcome.fetched,
            outcome.skipped_duplicates,
            outcome.processed.len()
        );
        Ok(outcome)
    }
}
