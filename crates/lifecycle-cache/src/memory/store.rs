//! moka-backed provider for single-process deployments.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use tracing::debug;

use lifecycle_core::config::cache::MemoryCacheConfig;
use lifecycle_core::result::AppResult;
use lifecycle_core::traits::cache::CacheProvider;

#[derive(Debug, Clone)]
struct Slot {
    raw: String,
    ttl: Duration,
}

/// Expires each slot after the TTL it was written with.
struct SlotTtl;

impl Expiry<String, Slot> for SlotTtl {
    fn expire_after_create(&self, _key: &String, slot: &Slot, _at: Instant) -> Option<Duration> {
        Some(slot.ttl)
    }

    fn expire_after_update(&self, _key: &String, slot: &Slot, _at: Instant, _left: Option<Duration>) -> Option<Duration> {
        Some(slot.ttl)
    }
}

/// Resolution entries held in process memory.
///
/// Entries vanish with the process, so only the workers of one process
/// share discovery results.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    slots: Cache<String, Slot>,
    ttl_ceiling: Duration,
}

impl MemoryCacheProvider {
    pub fn new(config: &MemoryCacheConfig) -> Self {
        Self {
            slots: Cache::builder()
                .max_capacity(config.max_capacity)
                .expire_after(SlotTtl)
                .build(),
            ttl_ceiling: Duration::from_secs(config.time_to_live_seconds),
        }
    }

    /// Number of live entries, after pending evictions are applied.
    pub async fn len(&self) -> u64 {
        self.slots.run_pending_tasks().await;
        self.slots.entry_count()
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.slots.get(key).await.map(|slot| slot.raw))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let slot = Slot {
            raw: value.to_string(),
            ttl: ttl.min(self.ttl_ceiling),
        };
        self.slots.insert(key.to_string(), slot).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.slots.invalidate(key).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.slots.contains_key(key))
    }

    async fn delete_pattern(&self, pattern: &str) -> AppResult<u64> {
        let prefix = pattern.strip_suffix('*').unwrap_or(pattern);
        let matching: Vec<String> = self
            .slots
            .iter()
            .filter_map(|(key, _)| key.starts_with(prefix).then(|| key.as_ref().clone()))
            .collect();

        let mut removed = 0;
        for key in &matching {
            if self.slots.remove(key).await.is_some() {
                removed += 1;
            }
        }

        debug!(pattern, removed, "Removed memory cache entries");
        Ok(removed)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
