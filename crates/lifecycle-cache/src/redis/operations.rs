//! `CacheProvider` over a shared Redis instance.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use lifecycle_core::error::{AppError, ErrorKind};
use lifecycle_core::result::AppResult;
use lifecycle_core::traits::cache::CacheProvider;

use super::client::RedisClient;

/// Keys fetched per SCAN round trip and deleted per DEL.
const BATCH: usize = 200;

/// Resolution entries shared by every process using the same key prefix.
#[derive(Debug, Clone)]
pub struct RedisCacheProvider {
    client: RedisClient,
}

fn cache_err(e: redis::RedisError) -> AppError {
    AppError::with_source(ErrorKind::Cache, format!("Redis error: {e}"), e)
}

impl RedisCacheProvider {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Every key matching `pattern`, walked with cursor-based SCAN so large
    /// keyspaces never block the server.
    async fn scan(&self, pattern: &str) -> AppResult<Vec<String>> {
        let mut conn = self.client.handle();
        let mut keys = Vec::new();
        let mut cursor = 0u64;

        loop {
            let (next, page): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(BATCH)
                .query_async(&mut conn)
                .await
                .map_err(cache_err)?;
            keys.extend(page);

            if next == 0 {
                return Ok(keys);
            }
            cursor = next;
        }
    }
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.client.handle();
        conn.get(self.client.namespaced(key)).await.map_err(cache_err)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        // SETEX rejects a zero expiry.
        let seconds = ttl.as_secs().max(1);
        let mut conn = self.client.handle();
        let _: () = conn
            .set_ex(self.client.namespaced(key), value, seconds)
            .await
            .map_err(cache_err)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.client.handle();
        let _: () = conn.del(self.client.namespaced(key)).await.map_err(cache_err)?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.client.handle();
        conn.exists(self.client.namespaced(key)).await.map_err(cache_err)
    }

    async fn delete_pattern(&self, pattern: &str) -> AppResult<u64> {
        let keys = self.scan(&self.client.namespaced(pattern)).await?;

        let mut conn = self.client.handle();
        let mut removed = 0u64;
        for batch in keys.chunks(BATCH) {
            let n: u64 = conn.del(batch.to_vec()).await.map_err(cache_err)?;
            removed += n;
        }

        debug!(pattern, removed, "Removed Redis cache entries");
        Ok(removed)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.handle();
        let reply: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(cache_err)?;
        Ok(reply == "PONG")
    }
}
