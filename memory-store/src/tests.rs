use crate::{DedupCache, InMemoryStore, MarkerStore, MemoryStore, SqliteStore};
use chrono::{TimeZone, Utc};
use murmur_core::{processing_key, ActionKind, ProcessingRecord};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_sqlite_store_roundtrip() {
    let store = SqliteStore::connect("sqlite::memory:").await.unwrap();

    assert!(!store.exists("post:p1-agent").await.unwrap());
    store
        .put("post:p1-agent", &json!({"post_id": "p1"}))
        .await
        .unwrap();
    assert!(store.exists("post:p1-agent").await.unwrap());

    let payload = store.get("post:p1-agent").await.unwrap().unwrap();
    assert_eq!(payload["post_id"], "p1");

    assert!(store.get("post:missing-agent").await.unwrap().is_none());
}

#[tokio::test]
async fn test_sqlite_put_is_upsert() {
    let store = SqliteStore::connect("sqlite::memory:").await.unwrap();

    store.put("k", &json!({"v": 1})).await.unwrap();
    store.put("k", &json!({"v": 2})).await.unwrap();

    let payload = store.get("k").await.unwrap().unwrap();
    assert_eq!(payload["v"], 2);
}

#[tokio::test]
async fn test_sqlite_ensure_connection_is_idempotent() {
    let store = SqliteStore::connect("sqlite::memory:").await.unwrap();

    store
        .ensure_connection("room:c1-agent", "user-1", "user-1")
        .await
        .unwrap();
    // Repeating the linkage must not fail on the primary key.
    store
        .ensure_connection("room:c1-agent", "user-1", "user-1")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_dedup_cache_marks_and_remembers() {
    let store: Arc<dyn MemoryStore> = Arc::new(InMemoryStore::new());
    let cache = DedupCache::new(store.clone());

    let key = processing_key("p1", "agent");
    assert!(!cache.has_processed(&key).await.unwrap());

    let record = ProcessingRecord::new("p1", "agent", vec![ActionKind::Like]);
    cache.mark_processed(&record).await.unwrap();

    assert!(cache.has_processed(&key).await.unwrap());
    let loaded = cache.get_record(&key).await.unwrap().unwrap();
    assert_eq!(loaded.executed_actions, vec![ActionKind::Like]);
}

#[tokio::test]
async fn test_dedup_survives_cache_restart() {
    let store: Arc<dyn MemoryStore> = Arc::new(InMemoryStore::new());

    let first = DedupCache::new(store.clone());
    let record = ProcessingRecord::new("p1", "agent", Vec::new());
    first.mark_processed(&record).await.unwrap();

    // A fresh cache over the same store simulates a process restart: the
    // mirror is empty but the store still answers.
    let second = DedupCache::new(store);
    assert!(second
        .has_processed(&processing_key("p1", "agent"))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_dedup_mark_twice_keeps_single_record() {
    let store = Arc::new(InMemoryStore::new());
    let cache = DedupCache::new(store.clone() as Arc<dyn MemoryStore>);

    let skeleton = ProcessingRecord::context_only("p1", "agent");
    cache.mark_processed(&skeleton).await.unwrap();

    let finished = ProcessingRecord::new("p1", "agent", vec![ActionKind::Share]);
    cache.mark_processed(&finished).await.unwrap();

    assert_eq!(store.record_count().await, 1);
    let loaded = cache
        .get_record(&processing_key("p1", "agent"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.executed_actions, vec![ActionKind::Share]);
}

#[tokio::test]
async fn test_marker_store_roundtrip() {
    let store: Arc<dyn MemoryStore> = Arc::new(InMemoryStore::new());
    let markers = MarkerStore::new(store, "agent-1");

    assert!(markers.last_run("new_post").await.unwrap().is_none());

    let ts = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    markers.record_run("new_post", ts).await.unwrap();

    assert_eq!(markers.last_run("new_post").await.unwrap(), Some(ts));
    // Scopes are independent.
    assert!(markers.last_run("timeline_sweep").await.unwrap().is_none());
}

#[tokio::test]
async fn test_markers_are_scoped_per_agent() {
    let store: Arc<dyn MemoryStore> = Arc::new(InMemoryStore::new());
    let a = MarkerStore::new(store.clone(), "agent-a");
    let b = MarkerStore::new(store, "agent-b");

    let ts = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    a.record_run("timeline_sweep", ts).await.unwrap();

    assert!(b.last_run("timeline_sweep").await.unwrap().is_none());
}
