// src/cache/recommendation.rs — Typed, fail-open cache for recommendation results

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::{CacheBackend, CacheLookup};
use crate::infra::config::CacheConfig;

/// TTL tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    Recommendations,
    Explanations,
}

impl CacheTier {
    pub fn ttl(&self, config: &CacheConfig) -> Duration {
        match self {
            CacheTier::Recommendations => Duration::from_secs(config.recommendation_ttl_secs),
            CacheTier::Explanations => Duration::from_secs(config.explanation_ttl_secs),
        }
    }
}

pub fn recommendation_key(student_id: &str) -> String {
    format!("recommendations:{student_id}")
}

pub fn explanation_key(recommendation_id: &str, project_id: &str) -> String {
    format!("explanation:{recommendation_id}:{project_id}")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub errors: u64,
}

impl CacheStats {
    /// hits / (hits + misses); 0 before any lookup.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

pub struct RecommendationCache {
    backend: Arc<dyn CacheBackend>,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    errors: AtomicU64,
}

impl RecommendationCache {
    pub fn new(backend: Arc<dyn CacheBackend>, config: CacheConfig) -> Self {
        Self {
            backend,
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self, tier: CacheTier) -> Duration {
        tier.ttl(&self.config)
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> CacheLookup<T> {
        let raw = match self.backend.get(key).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Cache read failed for '{key}', treating as miss: {e}");
                self.errors.fetch_add(1, Ordering::Relaxed);
                self.misses.fetch_add(1, Ordering::Relaxed);
                return CacheLookup::Unavailable(e.to_string());
            }
        };

        let Some(raw) = raw else {
            debug!("Cache miss: {key}");
            self.misses.fetch_add(1, Ordering::Relaxed);
            return CacheLookup::Miss;
        };

        match serde_json::from_str::<T>(&raw) {
            Ok(value) => {
                debug!("Cache hit: {key}");
                self.hits.fetch_add(1, Ordering::Relaxed);
                CacheLookup::Hit(value)
            }
            Err(e) => {
                warn!("Discarding undecodable cache entry '{key}': {e}");
                self.errors.fetch_add(1, Ordering::Relaxed);
                self.misses.fetch_add(1, Ordering::Relaxed);
                let _ = self.backend.del(key).await;
                CacheLookup::Unavailable(e.to_string())
            }
        }
    }

    /// Store `value` for `ttl`. Returns whether the write succeeded.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> bool {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Cache encode failed for '{key}': {e}");
                self.errors.fetch_add(1, Ordering::Relaxed);
                return false;
            }
        };
        match self.backend.set(key, raw, ttl).await {
            Ok(()) => {
                debug!("Cached '{key}' for {}s", ttl.as_secs());
                true
            }
            Err(e) => {
                warn!("Cache write failed for '{key}': {e}");
                self.errors.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    pub async fn set_tier<T: Serialize>(&self, key: &str, value: &T, tier: CacheTier) -> bool {
        self.set(key, value, self.ttl(tier)).await
    }

    pub async fn del(&self, key: &str) -> bool {
        match self.backend.del(key).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Cache invalidation failed for '{key}': {e}");
                self.errors.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }

    /// Shut down the backend handle.
    pub async fn close(&self) {
        if let Err(e) = self.backend.close().await {
            warn!("Cache backend close failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCacheBackend;
    use async_trait::async_trait;

    struct BrokenBackend;

    #[async_trait]
    impl CacheBackend for BrokenBackend {
        async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            anyhow::bail!("connection refused")
        }
        async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> anyhow::Result<()> {
            anyhow::bail!("connection refused")
        }
        async fn del(&self, _key: &str) -> anyhow::Result<()> {
            anyhow::bail!("connection refused")
        }
    }

    fn cache() -> RecommendationCache {
        RecommendationCache::new(
            Arc::new(InMemoryCacheBackend::default()),
            CacheConfig::default(),
        )
    }

    #[test]
    fn test_keys() {
        assert_eq!(recommendation_key("s-1"), "recommendations:s-1");
        assert_eq!(explanation_key("r-1", "p-2"), "explanation:r-1:p-2");
    }

    #[test]
    fn test_tier_ttls() {
        let config = CacheConfig::default();
        assert_eq!(CacheTier::Recommendations.ttl(&config), Duration::from_secs(3600));
        assert_eq!(CacheTier::Explanations.ttl(&config), Duration::from_secs(1800));
    }

    #[test]
    fn test_hit_ratio_without_observations_is_zero() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_ratio(), 0.0);
        assert!(!stats.hit_ratio().is_nan());
    }

    #[tokio::test]
    async fn test_hit_and_miss_accounting() {
        let cache = cache();
        assert_eq!(cache.get::<Vec<u32>>("k").await, CacheLookup::Miss);
        assert!(cache.set_tier("k", &vec![1u32, 2], CacheTier::Recommendations).await);
        assert_eq!(cache.get::<Vec<u32>>("k").await, CacheLookup::Hit(vec![1, 2]));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_ratio() - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_del_invalidates() {
        let cache = cache();
        cache.set_tier("k", &"v", CacheTier::Recommendations).await;
        assert!(cache.del("k").await);
        assert!(!cache.get::<String>("k").await.is_hit());
    }

    #[tokio::test]
    async fn test_backend_failures_are_swallowed() {
        let cache = RecommendationCache::new(Arc::new(BrokenBackend), CacheConfig::default());
        assert!(matches!(
            cache.get::<String>("k").await,
            CacheLookup::Unavailable(_)
        ));
        assert!(!cache.set_tier("k", &"v", CacheTier::Recommendations).await);
        assert!(!cache.del("k").await);
        assert_eq!(cache.stats().errors, 3);
        assert_eq!(cache.stats().hit_ratio(), 0.0);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_dropped() {
        let backend = Arc::new(InMemoryCacheBackend::default());
        backend
            .set("k", "not json".into(), Duration::from_secs(60))
            .await
            .unwrap();
        let cache = RecommendationCache::new(backend.clone(), CacheConfig::default());
        assert!(matches!(
            cache.get::<Vec<u32>>("k").await,
            CacheLookup::Unavailable(_)
        ));
        assert_eq!(backend.get("k").await.unwrap(), None);
    }
}
