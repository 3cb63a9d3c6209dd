//! Backend selection for the persisted resolution layer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use lifecycle_core::config::cache::CacheConfig;
use lifecycle_core::error::AppError;
use lifecycle_core::result::AppResult;
use lifecycle_core::traits::cache::CacheProvider;

/// The backend named by `[cache].provider`, behind one handle.
#[derive(Debug, Clone)]
pub struct CacheManager {
    inner: Arc<dyn CacheProvider>,
}

impl CacheManager {
    /// Connects the configured backend and probes it once.
    ///
    /// An unhealthy backend is logged but still returned: every read and
    /// write is best-effort, so resolution keeps working without it.
    pub async fn new(config: &CacheConfig) -> AppResult<Self> {
        let inner: Arc<dyn CacheProvider> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisCacheProvider::new(client))
            }
            #[cfg(feature = "memory")]
            "memory" => Arc::new(crate::memory::MemoryCacheProvider::new(&config.memory)),
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown or disabled cache provider: '{other}'"
                )));
            }
        };

        match inner.health_check().await {
            Ok(true) => info!(
                backend = inner.backend(),
                namespace = %config.key,
                ttl_seconds = config.ttl_seconds,
                "Resolution cache backend ready"
            ),
            Ok(false) => warn!(backend = inner.backend(), "Resolution cache backend unhealthy"),
            Err(e) => warn!(backend = inner.backend(), error = %e, "Resolution cache health check failed"),
        }

        Ok(Self { inner })
    }

    /// Wraps an already-built provider.
    pub fn from_provider(provider: Arc<dyn CacheProvider>) -> Self {
        Self { inner: provider }
    }

    pub fn shared(&self) -> Arc<dyn CacheProvider> {
        Arc::clone(&self.inner)
    }
}

#[async_trait]
impl CacheProvider for CacheManager {
    fn backend(&self) -> &'static str {
        self.inner.backend()
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.inner.exists(key).await
    }

    async fn delete_pattern(&self, pattern: &str) -> AppResult<u64> {
        self.inner.delete_pattern(pattern).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
