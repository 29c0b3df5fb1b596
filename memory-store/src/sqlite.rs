use crate::store::MemoryStore;
use async_trait::async_trait;
use chrono::Utc;
use murmur_core::{CoreError, StoreError};
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

/// SQLite-backed durable record store. One row per key; rooms and
/// participants live in side tables so conversation bookkeeping survives
/// restarts along with the records themselves.
#[derive(Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self, CoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| {
                CoreError::Store(StoreError::ConnectionFailed {
                    reason: e.to_string(),
                })
            })?;

        let store = Self { pool };
        store.create_schema().await?;
        info!("Connected to record store at {}", database_url);
        Ok(store)
    }

    async fn create_schema(&self) -> Result<(), CoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                key TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::Sql)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS rooms (
                room_id TEXT PRIMARY KEY,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::Sql)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS participants (
                room_id TEXT NOT NULL,
                participant_id TEXT NOT NULL,
                handle TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                PRIMARY KEY (room_id, participant_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::Sql)?;

        Ok(())
    }
}

#[async_trait]
impl MemoryStore for SqliteStore {
    async fn exists(&self, key: &str) -> Result<bool, CoreError> {
        let row = sqlx::query("SELECT 1 FROM records WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::Sql)?;
        Ok(row.is_some())
    }

    async fn put(&self, key: &str, payload: &Value) -> Result<(), CoreError> {
        let encoded = serde_json::to_string(payload).map_err(|e| {
            CoreError::Store(StoreError::Encoding {
                details: e.to_string(),
            })
        })?;
        let now = Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO records (key, payload, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET payload = excluded.payload
            "#,
        )
        .bind(key)
        .bind(encoded)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(StoreError::Sql)?;

        debug!("Stored record {}", key);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, CoreError> {
        let row = sqlx::query("SELECT payload FROM records WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::Sql)?;

        match row {
            Some(row) => {
                let payload: String = row.try_get("payload").map_err(StoreError::Sql)?;
                let value = serde_json::from_str(&payload).map_err(|e| {
                    CoreError::Store(StoreError::Encoding {
                        details: e.to_string(),
                    })
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn ensure_connection(
        &self,
        room_id: &str,
        participant_id: &str,
        handle: &str,
    ) -> Result<(), CoreError> {
        let now = Utc::now().timestamp();

        sqlx::query("INSERT OR IGNORE INTO rooms (room_id, created_at) VALUES (?, ?)")
            .bind(room_id)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(StoreError::Sql)?;

        sqlx::query(
            r#"
            INSERT OR IGNORE INTO participants (room_id, participant_id, handle, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(room_id)
        .bind(participant_id)
        .bind(handle)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(StoreError::Sql)?;

        Ok(())
    }
}
