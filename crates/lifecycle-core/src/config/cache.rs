//! `[cache]` section: the persisted half of hook resolution.
//!
//! Only discovered hook ids are written. Each entry lives under
//! `{key}:{target}:{point}` for `ttl_seconds`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// When false, discovery results are only memoised in-process.
    pub enabled: bool,
    /// `"memory"` or `"redis"`.
    pub provider: String,
    /// Namespace of resolution entries. Clearing the cache removes
    /// everything under it and nothing else.
    pub key: String,
    pub ttl_seconds: u64,
    pub redis: RedisCacheConfig,
    pub memory: MemoryCacheConfig,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: "memory".into(),
            key: "lifecycle.hooks".into(),
            ttl_seconds: 24 * 60 * 60,
            redis: RedisCacheConfig::default(),
            memory: MemoryCacheConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisCacheConfig {
    pub url: String,
    /// Prepended to every key, so several deployments can share one server.
    pub key_prefix: String,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".into(),
            key_prefix: "lifecycle:".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryCacheConfig {
    pub max_capacity: u64,
    /// Ceiling on any entry's lifetime, whatever TTL the writer asked for.
    pub time_to_live_seconds: u64,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            time_to_live_seconds: 24 * 60 * 60,
        }
    }
}
