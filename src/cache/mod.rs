// src/cache/mod.rs — TTL cache for computed results
//
// The backend is an injected handle (constructed at startup, closed at
// shutdown). Failures never propagate out of RecommendationCache: reads
// degrade to `CacheLookup::Unavailable`, writes and deletes are logged.

pub mod memory;
pub mod recommendation;

use async_trait::async_trait;
use std::time::Duration;

pub use memory::InMemoryCacheBackend;
pub use recommendation::{CacheStats, CacheTier, RecommendationCache};

/// Raw key/value storage with per-entry expiry.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> anyhow::Result<()>;

    async fn del(&self, key: &str) -> anyhow::Result<()>;

    /// Release connections. Default: nothing to release.
    async fn close(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Result of a cache read. `Unavailable` is a miss caused by a backend or decode failure.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup<T> {
    Hit(T),
    Miss,
    Unavailable(String),
}

impl<T> CacheLookup<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }
}
