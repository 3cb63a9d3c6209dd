//! Redis connection handling and key namespacing.

use redis::Client;
use redis::aio::ConnectionManager;
use tracing::info;

use lifecycle_core::config::cache::RedisCacheConfig;
use lifecycle_core::error::{AppError, ErrorKind};
use lifecycle_core::result::AppResult;

/// A reconnecting Redis connection scoped to one key prefix.
///
/// Every process sharing the same prefix sees the same resolution entries,
/// which is what lets several workers reuse one discovery pass.
#[derive(Debug, Clone)]
pub struct RedisClient {
    conn: ConnectionManager,
    key_prefix: String,
}

impl RedisClient {
    /// Open a connection described by `config`.
    pub async fn connect(config: &RedisCacheConfig) -> AppResult<Self> {
        info!(
            url = %mask_redis_url(&config.url),
            key_prefix = %config.key_prefix,
            "Connecting to Redis"
        );

        let client = Client::open(config.url.as_str()).map_err(|e| {
            AppError::with_source(ErrorKind::Cache, "Invalid Redis connection URL", e)
        })?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            AppError::with_source(ErrorKind::Cache, "Failed to connect to Redis", e)
        })?;

        Ok(Self {
            conn,
            key_prefix: config.key_prefix.clone(),
        })
    }

    /// A handle usable for one command sequence.
    ///
    /// `ConnectionManager` is cheap to clone and multiplexes over one socket.
    pub fn handle(&self) -> ConnectionManager {
        self.conn.clone()
    }

    /// Namespaced form of `key`.
    pub fn namespaced(&self, key: &str) -> String {
        format!("{}{key}", self.key_prefix)
    }
}

/// Replace the password in a Redis URL with `****` so it can be logged.
pub(crate) fn mask_redis_url(url: &str) -> String {
    let Some(at) = url.find('@') else {
        return url.to_string();
    };
    let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
    match url[..at].rfind(':') {
        Some(colon) if colon > scheme_end => {
            format!("{}:****@{}", &url[..colon], &url[at + 1..])
        }
        _ => url.to_string(),
    }
}
