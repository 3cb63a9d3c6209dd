//! # lifecycle-cache
//!
//! Backends for the persisted half of the hook resolution cache, selected
//! by `[cache].provider`:
//!
//! - `memory` (feature `memory`): moka, local to one process
//! - `redis` (feature `redis-backend`): shared by every process using the
//!   same key prefix
//!
//! [`keys`] builds the entry keys both sides agree on.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CacheManager;
