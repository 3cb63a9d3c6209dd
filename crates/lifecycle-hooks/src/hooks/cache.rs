//! Resolution cache.
//!
//! Two layers:
//!
//! 1. an in-process memo of resolved hook lists (hook instances cannot
//!    leave the process);
//! 2. the discovered hook ids of each `(target, point)`, persisted through a
//!    [`CacheProvider`] so that discovery runs once per TTL across restarts
//!    and across processes sharing a Redis backend.
//!
//! Persisted-layer failures are logged and treated as a miss.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tracing::{debug, info, warn};

use lifecycle_cache::keys;
use lifecycle_core::config::cache::CacheConfig;
use lifecycle_core::traits::cache::CacheProvider;

use crate::lifecycle::PointKey;

use super::catalog::ResolvedHookList;

/// Memoised resolutions plus the optional persisted discovery layer.
#[derive(Debug)]
pub struct ResolutionCache {
    resolved: DashMap<PointKey, ResolvedHookList>,
    store: Option<Arc<dyn CacheProvider>>,
    namespace: String,
    ttl: Duration,
}

impl ResolutionCache {
    /// Memo only; discovery runs on every cold resolution.
    pub fn in_memory() -> Self {
        Self {
            resolved: DashMap::new(),
            store: None,
            namespace: keys::DEFAULT_NAMESPACE.to_string(),
            ttl: Duration::from_secs(86_400),
        }
    }

    /// Memo plus a persisted discovery layer.
    pub fn with_store(store: Arc<dyn CacheProvider>, namespace: impl Into<String>, ttl: Duration) -> Self {
        Self {
            resolved: DashMap::new(),
            store: Some(store),
            namespace: namespace.into(),
            ttl,
        }
    }

    /// Builds the cache described by `[cache]`; `store` is ignored when the
    /// persisted layer is disabled.
    pub fn from_config(config: &CacheConfig, store: Option<Arc<dyn CacheProvider>>) -> Self {
        match store {
            Some(store) if config.enabled => Self::with_store(store, config.key.clone(), config.ttl()),
            _ => Self {
                namespace: config.key.clone(),
                ttl: config.ttl(),
                ..Self::in_memory()
            },
        }
    }

    /// Whether discovered ids are persisted.
    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    /// Key namespace of persisted entries.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Number of memoised resolutions.
    pub fn memo_len(&self) -> usize {
        self.resolved.len()
    }

    /// Memoised resolution of `key`.
    pub fn get(&self, key: &PointKey) -> Option<ResolvedHookList> {
        self.resolved.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Memoises a resolution.
    pub fn put(&self, key: PointKey, hooks: ResolvedHookList) {
        self.resolved.insert(key, hooks);
    }

    /// Drops the memoised resolution of `key`.
    pub fn invalidate(&self, key: &PointKey) {
        if self.resolved.remove(key).is_some() {
            debug!(key = %key, "Resolution invalidated");
        }
    }

    /// Persisted discovered ids of `key`, if any.
    pub async fn discovered_ids(&self, key: &PointKey) -> Option<Vec<String>> {
        let store = self.store.as_ref()?;
        let cache_key = keys::resolution(&self.namespace, &key.target, &key.point);

        let raw = match store.get(&cache_key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key = %cache_key, error = %e, "Resolution cache read failed");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(ids) => Some(ids),
            Err(e) => {
                warn!(key = %cache_key, error = %e, "Discarding unreadable resolution cache entry");
                None
            }
        }
    }

    /// Persists the discovered ids of `key`.
    pub async fn store_discovered_ids(&self, key: &PointKey, ids: &[String]) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        let cache_key = keys::resolution(&self.namespace, &key.target, &key.point);

        let raw = match serde_json::to_string(ids) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %cache_key, error = %e, "Failed to encode discovered hook ids");
                return;
            }
        };

        if let Err(e) = store.set(&cache_key, &raw, self.ttl).await {
            warn!(key = %cache_key, error = %e, "Resolution cache write failed");
        }
    }

    /// Drops every memoised resolution and persisted entry of the namespace.
    ///
    /// Returns the number of persisted entries removed.
    pub async fn clear(&self) -> u64 {
        let memoised = self.resolved.len();
        self.resolved.clear();

        let removed = match self.store.as_ref() {
            Some(store) => {
                let pattern = keys::resolution_pattern(&self.namespace);
                match store.delete_pattern(&pattern).await {
                    Ok(n) => n,
                    Err(e) => {
                        warn!(pattern = %pattern, error = %e, "Failed to clear persisted resolutions");
                        0
                    }
                }
            }
            None => 0,
        };

        info!(memoised, removed, namespace = %self.namespace, "Resolution cache cleared");
        removed
    }
}
