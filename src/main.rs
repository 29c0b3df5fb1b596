use generation_engine::OpenAiEngine;
use memory_store::{DedupCache, MarkerStore, MemoryStore, SqliteStore};
use murmur_core::AgentConfig;
use platform_client::{HttpPlatform, WritePacing, WriteQueue};
use std::sync::Arc;
use std::time::Duration;
use timeline_pipeline::{
    spawn_activity, ActionExecutor, ActivityCadence, PostComposer, ThreadReconstructor,
    TimelineSweep,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AgentConfig::from_env()?;
    info!(
        "Starting agent {} against {}",
        config.agent_id, config.platform_base_url
    );

    let store: Arc<dyn MemoryStore> = Arc::new(SqliteStore::connect(&config.database_url).await?);
    let adapter = Arc::new(HttpPlatform::new(
        &config.platform_base_url,
        &config.agent_name,
    )?);
    let engine = Arc::new(OpenAiEngine::new(
        &config.llm_base_url,
        config.llm_api_key.clone(),
        &config.llm_model,
    )?);

    let pacing = WritePacing {
        min_gap: Duration::from_millis(config.write_gap_min_ms),
        max_gap: Duration::from_millis(config.write_gap_max_ms),
    };
    let queue = WriteQueue::start(pacing, Duration::from_secs(config.write_timeout_secs));

    let dedup = Arc::new(DedupCache::new(store.clone()));
    let markers = MarkerStore::new(store.clone(), &config.agent_id);

    let reconstructor = Arc::new(ThreadReconstructor::new(
        adapter.clone(),
        store.clone(),
        &config.agent_id,
        config.max_thread_depth,
    ));
    let executor = Arc::new(ActionExecutor::new(
        adapter.clone(),
        engine.clone(),
        queue.clone(),
        dedup.clone(),
        store.clone(),
        &config.agent_id,
        &config.agent_name,
        config.max_post_chars,
    ));
    let sweep = Arc::new(TimelineSweep::new(
        adapter.clone(),
        engine.clone(),
        reconstructor,
        executor,
        dedup,
        &config.agent_id,
        &config.agent_name,
        config.timeline_fetch_limit,
    ));
    let composer = Arc::new(PostComposer::new(
        engine,
        adapter,
        queue,
        store,
        &config.agent_id,
        &config.agent_name,
        config.max_post_chars,
        config.dry_run,
    ));

    if config.post_immediately {
        info!("Posting immediately before entering the schedule");
        if let Err(e) = composer.compose_and_publish().await {
            error!("Immediate post failed: {}", e);
        }
        if let Err(e) = sweep.run().await {
            error!("Immediate timeline sweep failed: {}", e);
        }
    }

    let post_cadence =
        ActivityCadence::new_post(config.post_interval_min, config.post_interval_max);
    let sweep_cadence =
        ActivityCadence::timeline_sweep(config.timeline_interval_min, config.timeline_interval_max);

    let post_composer = composer.clone();
    let post_handle = spawn_activity(markers.clone(), post_cadence, move || {
        let composer = post_composer.clone();
        async move { composer.compose_and_publish().await.map(|_| ()) }
    });

    let sweep_runner = sweep.clone();
    let sweep_handle = spawn_activity(markers, sweep_cadence, move || {
        let sweep = sweep_runner.clone();
        async move { sweep.run().await.map(|_| ()) }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, stopping scheduled activities");
    post_handle.abort();
    sweep_handle.abort();

    info!("Agent stopped");
    Ok(())
}
