use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// In-process cache tier backed by moka with TTL and bounded capacity.
/// Entries are JSON strings shared via `Arc` so hits never deep-copy.
/// All methods are `&self` — no locking needed.
pub struct MemoryCache {
    entries: Cache<String, Arc<String>>,
}

impl MemoryCache {
    pub fn new(ttl_seconds: u64, max_capacity: u64) -> Self {
        let entries = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        MemoryCache { entries }
    }

    pub async fn get(&self, key: &str) -> Option<Arc<String>> {
        match self.entries.get(key).await {
            Some(value) => {
                tracing::debug!("Memory cache hit: {}", key);
                Some(value)
            }
            None => {
                tracing::debug!("Memory cache miss: {}", key);
                None
            }
        }
    }

    pub async fn insert(&self, key: &str, json: String) {
        self.entries.insert(key.to_string(), Arc::new(json)).await;
    }

    pub async fn remove(&self, key: &str) {
        self.entries.invalidate(key).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn miss_on_empty_cache() {
        let cache = MemoryCache::new(3600, 100);
        assert!(cache.get("nonexistent").await.is_none());
    }

    #[tokio::test]
    async fn roundtrip() {
        let cache = MemoryCache::new(3600, 100);
        cache.insert("key1", "{\"a\":1}".to_string()).await;
        let value = cache.get("key1").await.unwrap();
        assert_eq!(value.as_str(), "{\"a\":1}");
    }

    #[tokio::test]
    async fn hit_returns_shared_value_after_eviction_pressure() {
        let cache = MemoryCache::new(3600, 100);
        cache.insert("key1", "first".to_string()).await;
        let held = cache.get("key1").await.unwrap();

        // A previously-returned value is unaffected by later removal
        cache.remove("key1").await;
        assert_eq!(held.as_str(), "first");
        assert!(cache.get("key1").await.is_none());
    }

    #[tokio::test]
    async fn ttl_expiry() {
        let cache = MemoryCache::new(1, 100); // 1 second TTL
        cache.insert("key1", "value".to_string()).await;

        assert!(cache.get("key1").await.is_some());

        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(cache.get("key1").await.is_none());
    }
}
