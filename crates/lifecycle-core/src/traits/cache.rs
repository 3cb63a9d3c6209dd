//! Storage behind the persisted resolution layer.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Key/value backend for resolution entries.
///
/// Keys arrive fully built (`{namespace}:{target}:{point}`); a backend may
/// add its own prefix on top. Values are JSON strings. Callers treat every
/// error as a cache miss, so implementations should fail fast rather than
/// retry.
#[async_trait]
pub trait CacheProvider: Send + Sync + fmt::Debug + 'static {
    /// Short backend name used in logs (`"memory"`, `"redis"`).
    fn backend(&self) -> &'static str;

    /// Value stored under `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Stores `value` under `key` for at most `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    async fn delete(&self, key: &str) -> AppResult<()>;

    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Deletes every key starting with `pattern` minus its trailing `*`.
    ///
    /// Returns the number of keys removed.
    async fn delete_pattern(&self, pattern: &str) -> AppResult<u64>;

    /// Whether the backend currently answers.
    async fn health_check(&self) -> AppResult<bool>;

    /// Typed read of a JSON value.
    async fn get_json<T: serde::de::DeserializeOwned + Send>(&self, key: &str) -> AppResult<Option<T>>
    where
        Self: Sized,
    {
        let Some(raw) = self.get(key).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Typed write of a JSON value.
    async fn set_json<T: serde::Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: Duration) -> AppResult<()>
    where
        Self: Sized,
    {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw, ttl).await
    }
}
