use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::error::CacheResult;
use crate::config::{self, CacheBackend};
use crate::model::DbConnection;

/// Connect/acquire timeout for a dedicated cache database.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Key/value store for resolved video URLs.
#[async_trait]
pub trait VideoCache: Send + Sync {
    async fn ping(&self) -> CacheResult<()>;
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;
}

/// Cache rows in the `video_cache` table.
#[derive(Debug, Clone)]
pub struct PgVideoCache {
    db: DbConnection,
}

impl PgVideoCache {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Deletes expired rows, returns how many were removed.
    pub async fn purge_expired(&self) -> CacheResult<u64> {
        let result = sqlx::query("DELETE FROM video_cache WHERE expires_at <= now()")
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl VideoCache for PgVideoCache {
    async fn ping(&self) -> CacheResult<()> {
        sqlx::query("SELECT 1 FROM video_cache LIMIT 1")
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let value = sqlx::query_scalar(
            "SELECT value FROM video_cache WHERE key = $1 AND expires_at > now()",
        )
        .bind(key)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        sqlx::query(
            r#"
            INSERT INTO video_cache (key, value, expires_at) VALUES ($1, $2, $3)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(expires_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }
}

/// Process-local cache. Entries are dropped lazily on read.
/// `None` as expiry means the ttl did not fit into an [`Instant`].
#[derive(Debug, Default)]
pub struct MemoryVideoCache {
    entries: RwLock<HashMap<String, (String, Option<Instant>)>>,
}

fn is_live(expires: Option<Instant>, now: Instant) -> bool {
    expires.is_none_or(|at| at > now)
}

impl MemoryVideoCache {
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl VideoCache for MemoryVideoCache {
    async fn ping(&self) -> CacheResult<()> {
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some((value, expires)) if is_live(*expires, Instant::now()) => {
                    return Ok(Some(value.clone()));
                }
                Some(_) => {}
            }
        }

        // a `set` may have refreshed the entry since the read lock was released
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some((value, expires)) if is_live(*expires, Instant::now()) => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let expires = Instant::now().checked_add(ttl);
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value.to_string(), expires));
        Ok(())
    }
}

/// Best-effort wrapper around an optional [`VideoCache`].
///
/// The store is probed once when the layer is built. A failed probe
/// disables caching for the rest of the process. Read and write errors
/// afterwards are logged and behave like a miss / no-op.
#[derive(Clone, Default)]
pub struct CacheLayer {
    inner: Option<Arc<dyn VideoCache>>,
}

impl std::fmt::Debug for CacheLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheLayer")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl CacheLayer {
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub async fn probe(cache: Arc<dyn VideoCache>) -> Self {
        match cache.ping().await {
            Ok(()) => {
                tracing::info!("video cache connected successfully.");
                Self { inner: Some(cache) }
            }
            Err(e) => {
                tracing::warn!("video cache not available: {e}. Caching disabled.");
                Self::disabled()
            }
        }
    }

    pub async fn from_config(config: &config::Cache, db: &DbConnection) -> Self {
        match config.backend() {
            CacheBackend::Disabled => {
                tracing::info!("video cache disabled by config.");
                Self::disabled()
            }
            CacheBackend::Memory => Self::probe(Arc::new(MemoryVideoCache::default())).await,
            CacheBackend::Postgres => {
                let conn = match config.database_uri() {
                    None => db.clone(),
                    Some(uri) => match DbConnection::connect_with_timeout(uri, PROBE_TIMEOUT) {
                        Ok(conn) => conn,
                        Err(e) => {
                            tracing::warn!("video cache not available: {e}. Caching disabled.");
                            return Self::disabled();
                        }
                    },
                };
                Self::probe(Arc::new(PgVideoCache::new(conn))).await
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let cache = self.inner.as_ref()?;
        match cache.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("video cache get error: {e}");
                None
            }
        }
    }

    pub async fn set(&self, key: &str, value: &str, ttl: Duration) {
        let Some(cache) = self.inner.as_ref() else {
            return;
        };

        match cache.set(key, value, ttl).await {
            Ok(()) => tracing::info!("cached: {key} -> {value} (ttl: {}s)", ttl.as_secs()),
            Err(e) => tracing::warn!("video cache set error: {e}"),
        }
    }
}
