pub mod memory;
pub mod redis;

pub use memory::MemoryCache;
pub use redis::RedisCache;

use crate::constants::DEFAULT_DISCOVER_CACHE_TTL_SECONDS;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Distributed cache backend. Implementations must never fail a request:
/// errors degrade to a miss on reads and are swallowed on writes.
#[async_trait]
pub trait DistributedCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: String, ttl_seconds: u64);
    /// Delete keys matching a glob pattern, returning the number removed.
    async fn invalidate(&self, pattern: &str) -> usize;
    async fn exists(&self, key: &str) -> bool;
    async fn delete(&self, key: &str) -> bool;
    fn backend_name(&self) -> &'static str;
}

/// Build the cache key for a discover response.
/// City is trimmed and lowercased; interests are sorted so that key identity
/// does not depend on the order the client sent them in.
pub fn discover_cache_key(city: &str, limit: usize, interests: Option<&[String]>) -> String {
    let city_norm = city.trim().to_lowercase();
    let interest_str = match interests {
        Some(list) if !list.is_empty() => {
            let mut sorted: Vec<String> = list.iter().map(|i| i.trim().to_lowercase()).collect();
            sorted.sort();
            sorted.join(",")
        }
        _ => "default".to_string(),
    };
    format!("discover:{}:{}:{}", city_norm, limit, interest_str)
}

/// Build the cache key for a single POI lookup.
pub fn poi_cache_key(city: &str, place_id: &str) -> String {
    format!("poi:{}:{}", city.trim().to_lowercase(), place_id)
}

/// Build the cache key for a famous-food discover response.
pub fn food_cache_key(city: &str, category: &str, limit: usize) -> String {
    format!(
        "discover_food:{}:{}:{}",
        city.trim().to_lowercase(),
        category,
        limit
    )
}

/// Two-tier cache: a process-local moka tier in front of an optional
/// distributed tier. Values are stored as JSON in both tiers so that a
/// distributed hit can be promoted locally without re-serialization.
pub struct CacheService {
    memory: MemoryCache,
    distributed: Option<Arc<dyn DistributedCache>>,
    default_ttl: u64,
}

impl CacheService {
    pub fn new(
        memory: MemoryCache,
        distributed: Option<Arc<dyn DistributedCache>>,
        default_ttl: u64,
    ) -> Self {
        CacheService {
            memory,
            distributed,
            default_ttl,
        }
    }

    /// A memory-only cache with default TTL, for tests and cache-less deployments.
    pub fn memory_only(max_entries: u64) -> Self {
        CacheService::new(
            MemoryCache::new(DEFAULT_DISCOVER_CACHE_TTL_SECONDS, max_entries),
            None,
            DEFAULT_DISCOVER_CACHE_TTL_SECONDS,
        )
    }

    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    /// Local tier first; on a distributed hit the value is promoted locally.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if let Some(json) = self.memory.get(key).await {
            match serde_json::from_str(&json) {
                Ok(value) => return Some(value),
                Err(e) => {
                    tracing::warn!("Failed to deserialize local cache entry {}: {}", key, e);
                }
            }
        }

        let distributed = self.distributed.as_ref()?;
        let json = distributed.get(key).await?;
        match serde_json::from_str(&json) {
            Ok(value) => {
                self.memory.insert(key, json).await;
                Some(value)
            }
            Err(e) => {
                tracing::warn!("Failed to deserialize cached value for {}: {}", key, e);
                None
            }
        }
    }

    /// Write both tiers. Distributed failures are fire-and-forget.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl_seconds: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!("Failed to serialize value for cache key {}: {}", key, e);
                return;
            }
        };

        self.memory.insert(key, json.clone()).await;

        if let Some(distributed) = &self.distributed {
            distributed.set(key, json, ttl_seconds).await;
        }
    }

    pub async fn set_default_ttl<T: Serialize>(&self, key: &str, value: &T) {
        self.set(key, value, self.default_ttl).await;
    }

    /// Pattern invalidation runs against the distributed tier only; local
    /// entries age out via their TTL.
    pub async fn invalidate(&self, pattern: &str) -> usize {
        match &self.distributed {
            Some(distributed) => distributed.invalidate(pattern).await,
            None => 0,
        }
    }

    /// Remove one key from both tiers. Returns whether the distributed
    /// tier held it.
    pub async fn delete(&self, key: &str) -> bool {
        self.memory.remove(key).await;
        match &self.distributed {
            Some(distributed) => distributed.delete(key).await,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discover_key_canonicalizes_city_and_interests() {
        let a = discover_cache_key(
            "Lisbon",
            18,
            Some(&["museums".to_string(), "history".to_string()]),
        );
        let b = discover_cache_key(
            "  LISBON ",
            18,
            Some(&["history".to_string(), "museums".to_string()]),
        );
        assert_eq!(a, b);
        assert_eq!(a, "discover:lisbon:18:history,museums");
    }

    #[test]
    fn discover_key_defaults_without_interests() {
        assert_eq!(
            discover_cache_key("Porto", 20, None),
            "discover:porto:20:default"
        );
        assert_eq!(
            discover_cache_key("Porto", 20, Some(&[])),
            "discover:porto:20:default"
        );
    }

    #[test]
    fn poi_key_lowercases_city_only() {
        assert_eq!(
            poi_cache_key("Paris", "osm_node_123"),
            "poi:paris:osm_node_123"
        );
        assert_eq!(
            poi_cache_key("Paris", "OSM_Node_123"),
            "poi:paris:OSM_Node_123"
        );
    }

    #[test]
    fn food_key_format() {
        assert_eq!(
            food_cache_key("Vienna ", "cafes", 10),
            "discover_food:vienna:cafes:10"
        );
    }

    #[tokio::test]
    async fn get_after_set_roundtrip() {
        let cache = CacheService::memory_only(100);
        cache.set("k1", &vec![1, 2, 3], 60).await;
        let value: Option<Vec<i32>> = cache.get("k1").await;
        assert_eq!(value, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn miss_on_absent_key() {
        let cache = CacheService::memory_only(100);
        let value: Option<String> = cache.get("absent").await;
        assert!(value.is_none());
    }
}
