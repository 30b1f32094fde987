//! Redis-backed cache store.

use super::CacheStore;
use async_trait::async_trait;
use carebook_config::CacheConfig;
use carebook_core::{CarebookError, CarebookResult, HealthCheck, HealthStatus};
use deadpool_redis::{redis::AsyncCommands, Config, Pool, PoolConfig, Runtime};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Redis-backed cache store.
#[derive(Clone)]
pub struct RedisCacheStore {
    /// Redis connection pool.
    pool: Option<Arc<Pool>>,
}

impl RedisCacheStore {
    /// Creates a store over an existing pool.
    #[must_use]
    pub fn new(pool: Arc<Pool>) -> Self {
        Self { pool: Some(pool) }
    }

    /// Builds a pool from configuration. Connections are opened lazily.
    pub fn connect(config: &CacheConfig) -> CarebookResult<Self> {
        info!("Creating Redis pool of size {}", config.pool_size);

        let mut cfg = Config::from_url(config.url.as_str());
        cfg.pool = Some(PoolConfig::new(config.pool_size));
        let pool = cfg.create_pool(Some(Runtime::Tokio1)).map_err(|e| {
            CarebookError::Configuration(format!("Failed to create Redis pool: {}", e))
        })?;

        Ok(Self::new(Arc::new(pool)))
    }

    /// Creates a no-op store (for when caching is disabled).
    #[must_use]
    pub fn disabled() -> Self {
        Self { pool: None }
    }

    /// Returns true if a pool is attached.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    async fn get_conn(&self) -> CarebookResult<deadpool_redis::Connection> {
        match &self.pool {
            Some(pool) => pool.get().await.map_err(|e| {
                CarebookError::Cache(format!("Failed to get Redis connection: {}", e))
            }),
            None => Err(CarebookError::Cache("Cache is disabled".to_string())),
        }
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> CarebookResult<Option<Vec<u8>>> {
        if !self.is_enabled() {
            return Ok(None);
        }

        let mut conn = self.get_conn().await?;
        let value: Option<Vec<u8>> = conn.get(key).await.map_err(|e| {
            CarebookError::Cache(format!("Failed to get key '{}': {}", key, e))
        })?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CarebookResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let mut conn = self.get_conn().await?;
        let ttl_secs = ttl.as_secs().max(1);

        conn.set_ex::<_, _, ()>(key, value, ttl_secs).await.map_err(|e| {
            CarebookError::Cache(format!("Failed to set key '{}': {}", key, e))
        })?;

        debug!("Cached key '{}' with TTL {}s", key, ttl_secs);
        Ok(())
    }

    async fn delete(&self, key: &str) -> CarebookResult<bool> {
        if !self.is_enabled() {
            return Ok(false);
        }

        let mut conn = self.get_conn().await?;
        let deleted: i64 = conn.del(key).await.map_err(|e| {
            CarebookError::Cache(format!("Failed to delete key '{}': {}", key, e))
        })?;
        Ok(deleted > 0)
    }

    async fn close(&self) -> CarebookResult<()> {
        if let Some(pool) = &self.pool {
            info!("Closing Redis pool...");
            pool.close();
        }
        Ok(())
    }
}

#[async_trait]
impl HealthCheck for RedisCacheStore {
    fn name(&self) -> &str {
        "redis"
    }

    async fn check(&self) -> HealthStatus {
        if !self.is_enabled() {
            return HealthStatus::Degraded("cache disabled".to_string());
        }

        let mut conn = match self.get_conn().await {
            Ok(conn) => conn,
            Err(e) => return HealthStatus::Degraded(e.to_string()),
        };
        let pong: Result<String, _> = deadpool_redis::redis::cmd("PING")
            .query_async(&mut conn)
            .await;
        // Reads fall through to the repository, so a dead cache only degrades.
        match pong {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Degraded(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_store_is_a_permanent_miss() {
        let store = RedisCacheStore::disabled();
        assert!(!store.is_enabled());

        store.set("k", b"v", Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(!store.delete("k").await.unwrap());
        assert!(store.close().await.is_ok());
    }

    #[tokio::test]
    async fn test_connect_builds_lazy_pool() {
        let config = CacheConfig::default();
        let store = RedisCacheStore::connect(&config).unwrap();
        assert!(store.is_enabled());
    }
}
