use crate::cache::DistributedCache;
use crate::constants::REDIS_INVALIDATE_SCAN_BATCH;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// Redis-backed distributed tier. All methods are `&self` —
/// `ConnectionManager` is `Arc`-based internally, so `.clone()` is a cheap
/// atomic increment. Every operation degrades to a miss/no-op on failure;
/// the cache is never allowed to fail a request.
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| AppError::Cache(format!("Failed to create Redis client: {}", e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Cache(format!("Failed to connect to Redis: {}", e)))?;

        tracing::info!("Redis cache connection established");

        Ok(RedisCache { connection })
    }
}

#[async_trait]
impl DistributedCache for RedisCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.connection.clone();
        let result: redis::RedisResult<Option<String>> = conn.get(key).await;

        match result {
            Ok(Some(json)) => {
                tracing::debug!("Redis cache hit: {}", key);
                Some(json)
            }
            Ok(None) => {
                tracing::debug!("Redis cache miss: {}", key);
                None
            }
            Err(e) => {
                tracing::warn!("Redis error getting {}: {}", key, e);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: String, ttl_seconds: u64) {
        let mut conn = self.connection.clone();
        let result: redis::RedisResult<()> = conn.set_ex(key, value, ttl_seconds).await;

        match result {
            Ok(()) => {
                tracing::debug!("Redis cached {} with TTL {}s", key, ttl_seconds);
            }
            Err(e) => {
                tracing::warn!("Failed to cache {}: {}", key, e);
            }
        }
    }

    async fn invalidate(&self, pattern: &str) -> usize {
        let mut conn = self.connection.clone();
        let mut deleted = 0usize;
        let mut cursor: u64 = 0;

        // SCAN instead of KEYS so invalidation never blocks on large key spaces
        loop {
            let result: redis::RedisResult<(u64, Vec<String>)> = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(REDIS_INVALIDATE_SCAN_BATCH)
                .query_async(&mut conn)
                .await;

            let (next_cursor, keys) = match result {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::warn!("Redis SCAN failed for pattern {}: {}", pattern, e);
                    return deleted;
                }
            };

            if !keys.is_empty() {
                let removed: redis::RedisResult<usize> = conn.del(&keys).await;
                deleted += removed.unwrap_or(0);
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        tracing::debug!("Invalidated {} keys matching {}", deleted, pattern);
        deleted
    }

    async fn exists(&self, key: &str) -> bool {
        let mut conn = self.connection.clone();
        let result: redis::RedisResult<bool> = conn.exists(key).await;
        result.unwrap_or(false)
    }

    async fn delete(&self, key: &str) -> bool {
        let mut conn = self.connection.clone();
        let result: redis::RedisResult<usize> = conn.del(key).await;
        result.map(|n| n > 0).unwrap_or(false)
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
