//! Seams implemented outside `lifecycle-core`.

pub mod cache;

pub use cache::CacheProvider;
