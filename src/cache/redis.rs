use super::config::CacheConfig;
use crate::error::{Result, WharfError};
use crate::health::{ComponentHealth, HealthCheck};
use redis::aio::MultiplexedConnection;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Redis client sharing one multiplexed connection
#[derive(Clone)]
pub struct RedisCache {
    conn: MultiplexedConnection,
    default_ttl: Duration,
}

impl RedisCache {
    /// Connect and verify with `PING`.
    pub async fn connect(config: &CacheConfig) -> Result<Self> {
        let client = redis::Client::open(config.redis_url.as_str())
            .map_err(|e| WharfError::internal(format!("invalid Redis URL: {e}")))?;
        let conn = client.get_multiplexed_async_connection().await?;

        let cache = Self {
            conn,
            default_ttl: config.default_ttl(),
        };
        cache.ping().await?;

        tracing::info!(default_ttl_secs = cache.default_ttl.as_secs(), "redis connected");
        Ok(cache)
    }

    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value = redis::cmd("GET")
            .arg(key)
            .query_async::<Option<String>>(&mut conn)
            .await?;
        Ok(value)
    }

    /// Store `value`, expiring after `ttl` or the configured default.
    pub async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let ttl = ttl.unwrap_or(self.default_ttl).as_secs().max(1);
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl)
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }

    /// Returns whether the key existed.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let removed = redis::cmd("DEL")
            .arg(key)
            .query_async::<u64>(&mut conn)
            .await?;
        Ok(removed > 0)
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}

/// Reports as `redis`
pub struct RedisHealthCheck {
    cache: Arc<RedisCache>,
}

impl RedisHealthCheck {
    pub fn new(cache: Arc<RedisCache>) -> Self {
        Self { cache }
    }
}

impl HealthCheck for RedisHealthCheck {
    fn name(&self) -> &str {
        "redis"
    }

    fn check(&self) -> Pin<Box<dyn Future<Output = ComponentHealth> + Send + '_>> {
        Box::pin(async move {
            match self.cache.ping().await {
                Ok(()) => ComponentHealth::ok(),
                Err(e) => ComponentHealth::error(e.to_string()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // needs a Redis server on localhost
    async fn set_get_delete() {
        let cache = RedisCache::connect(&CacheConfig::new("redis://127.0.0.1/"))
            .await
            .unwrap();

        cache.set("wharf:test", "value", None).await.unwrap();
        assert_eq!(cache.get("wharf:test").await.unwrap().as_deref(), Some("value"));

        assert!(cache.delete("wharf:test").await.unwrap());
        assert_eq!(cache.get("wharf:test").await.unwrap(), None);
        assert!(!cache.delete("wharf:test").await.unwrap());
    }

    #[tokio::test]
    async fn unreachable_server_fails_to_connect() {
        let result = RedisCache::connect(&CacheConfig::new("redis://127.0.0.1:1/")).await;
        assert!(result.is_err());
    }
}
