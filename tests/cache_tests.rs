use async_trait::async_trait;
use citywalk::cache::{
    discover_cache_key, food_cache_key, poi_cache_key, CacheService, DistributedCache, MemoryCache,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

mod common;

/// In-memory stand-in for the distributed tier, with a kill switch to
/// simulate an outage.
#[derive(Default)]
struct StubDistributedCache {
    entries: Mutex<HashMap<String, String>>,
    gets: AtomicUsize,
    broken: std::sync::atomic::AtomicBool,
}

impl StubDistributedCache {
    fn break_backend(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl DistributedCache for StubDistributedCache {
    async fn get(&self, key: &str) -> Option<String> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.broken.load(Ordering::SeqCst) {
            return None;
        }
        self.entries.lock().unwrap().get(key).cloned()
    }

    async fn set(&self, key: &str, value: String, _ttl_seconds: u64) {
        if self.broken.load(Ordering::SeqCst) {
            return;
        }
        self.entries.lock().unwrap().insert(key.to_string(), value);
    }

    async fn invalidate(&self, pattern: &str) -> usize {
        let prefix = pattern.trim_end_matches('*');
        let mut entries = self.entries.lock().unwrap();
        let keys: Vec<String> = entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        for key in &keys {
            entries.remove(key);
        }
        keys.len()
    }

    async fn exists(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    async fn delete(&self, key: &str) -> bool {
        self.entries.lock().unwrap().remove(key).is_some()
    }

    fn backend_name(&self) -> &'static str {
        "stub"
    }
}

fn tiered(stub: std::sync::Arc<StubDistributedCache>) -> CacheService {
    CacheService::new(
        MemoryCache::new(3600, 100),
        Some(stub as std::sync::Arc<dyn DistributedCache>),
        3600,
    )
}

#[tokio::test]
async fn get_after_set_returns_equivalent_value() {
    let stub = std::sync::Arc::new(StubDistributedCache::default());
    let cache = tiered(stub);

    let value = vec!["a".to_string(), "b".to_string()];
    cache.set("k", &value, 60).await;

    let got: Option<Vec<String>> = cache.get("k").await;
    assert_eq!(got, Some(value));
}

#[tokio::test]
async fn local_tier_answers_without_touching_distributed() {
    let stub = std::sync::Arc::new(StubDistributedCache::default());
    let cache = tiered(stub.clone());

    cache.set("k", &42u32, 60).await;
    let _: Option<u32> = cache.get("k").await;

    assert_eq!(
        stub.gets.load(Ordering::SeqCst),
        0,
        "a local hit must not query the distributed tier"
    );
}

#[tokio::test]
async fn distributed_hit_is_promoted_to_local() {
    let stub = std::sync::Arc::new(StubDistributedCache::default());
    stub.set("k", "\"remote\"".to_string(), 60).await;

    let cache = tiered(stub.clone());

    let first: Option<String> = cache.get("k").await;
    assert_eq!(first, Some("remote".to_string()));
    assert_eq!(stub.gets.load(Ordering::SeqCst), 1);

    // Promoted: the second read is served locally
    let second: Option<String> = cache.get("k").await;
    assert_eq!(second, Some("remote".to_string()));
    assert_eq!(stub.gets.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn distributed_failure_degrades_to_miss() {
    let stub = std::sync::Arc::new(StubDistributedCache::default());
    stub.break_backend();

    let cache = tiered(stub);
    let got: Option<String> = cache.get("anything").await;
    assert!(got.is_none());

    // Writes also swallow the failure silently
    let cache2 = tiered(std::sync::Arc::new(StubDistributedCache::default()));
    cache2.set("k", &1u8, 60).await;
}

#[tokio::test]
async fn invalidate_removes_matching_distributed_keys() {
    let stub = std::sync::Arc::new(StubDistributedCache::default());
    let cache = tiered(stub.clone());

    cache.set("discover:lisbon:18:default", &1u8, 60).await;
    cache.set("discover:porto:18:default", &2u8, 60).await;
    cache.set("poi:lisbon:osm_node_1", &3u8, 60).await;

    let removed = cache.invalidate("discover:*").await;
    assert_eq!(removed, 2);
    assert!(stub.exists("poi:lisbon:osm_node_1").await);
}

#[tokio::test]
async fn delete_removes_from_both_tiers() {
    let stub = std::sync::Arc::new(StubDistributedCache::default());
    let cache = tiered(stub.clone());

    cache.set("k", &7u8, 60).await;
    assert!(cache.delete("k").await);

    let got: Option<u8> = cache.get("k").await;
    assert!(got.is_none());
    assert!(!stub.exists("k").await);
}

#[tokio::test]
async fn memory_only_service_works_without_distributed_tier() {
    let cache = CacheService::memory_only(10);
    cache.set("k", &"v".to_string(), 60).await;
    let got: Option<String> = cache.get("k").await;
    assert_eq!(got, Some("v".to_string()));
    assert_eq!(cache.invalidate("k*").await, 0);
}

#[test]
fn cache_keys_are_canonical() {
    // City casing/whitespace and interest order never change the key
    let a = discover_cache_key(
        "Lisbon",
        18,
        Some(&["b".to_string(), "a".to_string()]),
    );
    let b = discover_cache_key(
        " lisbon ",
        18,
        Some(&["a".to_string(), "b".to_string()]),
    );
    assert_eq!(a, b);

    assert_eq!(poi_cache_key("PARIS", "osm_way_9"), "poi:paris:osm_way_9");
    assert_eq!(
        food_cache_key("Wien", "bars", 5),
        "discover_food:wien:bars:5"
    );
}
