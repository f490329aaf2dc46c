//! Persistence for conversation state.
//!
//! A session only needs a tiny key-value capability: the history lives as a
//! single JSON blob under one well-known key, and the widget's "dismissed"
//! flag lives under another.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::ConversationLog;
use crate::error::AppError;

/// Key under which the history is stored unless configured otherwise.
pub const DEFAULT_HISTORY_KEY: &str = "chatbotHistory";

/// Key of the flag set once the user closes the widget.
pub const DISMISSED_KEY: &str = "chatbotClosed";

/// String key-value storage injected into a session.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
}

/// In-process store. Clones share the same map, so a "restarted" session
/// can be handed a clone to see previously saved data.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, AppError> {
        self.entries
            .lock()
            .map_err(|e| AppError::Storage(format!("memory store poisoned: {}", e)))
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// SQLite-backed store with a single `kv_store` table.
#[derive(Debug, Clone)]
pub struct SqliteKvStore {
    pool: SqlitePool,
}

impl SqliteKvStore {
    /// Opens (creating if needed) the database file at `path`.
    pub async fn open(path: &Path) -> Result<Self, AppError> {
        let db_url = format!("sqlite://{}", path.to_string_lossy());
        info!("Opening history database at: {}", db_url);

        let options = SqliteConnectOptions::from_str(&db_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    /// Wraps an existing pool and makes sure the table exists.
    pub async fn with_pool(pool: SqlitePool) -> Result<Self, AppError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Loads and saves a [`ConversationLog`] as one JSON value in a
/// [`KeyValueStore`].
#[derive(Clone)]
pub struct ConversationStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
}

impl ConversationStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(kv, DEFAULT_HISTORY_KEY)
    }

    pub fn with_key(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the persisted history; a missing key is an empty log.
    pub async fn load(&self) -> Result<ConversationLog, AppError> {
        match self.kv.get(&self.key).await? {
            Some(raw) => {
                let log = ConversationLog::from_json(&raw)
                    .map_err(|e| AppError::Storage(format!("corrupt history blob: {}", e)))?;
                debug!(records = log.len(), key = %self.key, "Loaded conversation history");
                Ok(log)
            }
            None => Ok(ConversationLog::new()),
        }
    }

    pub async fn save(&self, log: &ConversationLog) -> Result<(), AppError> {
        let raw = log.to_json()?;
        self.kv.set(&self.key, &raw).await
    }

    pub async fn is_dismissed(&self) -> Result<bool, AppError> {
        Ok(self.kv.get(DISMISSED_KEY).await?.as_deref() == Some("true"))
    }

    pub async fn set_dismissed(&self) -> Result<(), AppError> {
        self.kv.set(DISMISSED_KEY, "true").await
    }
}
