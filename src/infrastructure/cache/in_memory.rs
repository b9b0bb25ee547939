//! In-memory cache implementation using moka

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use tokio::time::Instant;
use tracing::debug;

use crate::domain::cache::{Cache, CacheMetrics};
use crate::domain::DomainError;

/// Configuration for in-memory cache
#[derive(Debug, Clone)]
pub struct InMemoryCacheConfig {
    /// Maximum number of entries
    pub max_capacity: u64,
}

impl Default for InMemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 100_000,
        }
    }
}

impl InMemoryCacheConfig {
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }
}

/// Cache entry stored in moka
#[derive(Debug, Clone)]
struct CacheEntry {
    /// Serialized JSON value
    data: String,
    /// `None` when the TTL is too large to represent
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    deletes: AtomicU64,
    expirations: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64, by: u64) {
        counter.fetch_add(by, Ordering::Relaxed);
    }
}

/// Thread-safe in-memory TTL store backed by moka
///
/// Every entry carries its own deadline. Expired entries read as absent
/// and are dropped lazily on access or in bulk by [`Cache::purge_expired`].
/// Capacity eviction is left to moka.
#[derive(Debug)]
pub struct InMemoryCache {
    cache: MokaCache<String, CacheEntry>,
    counters: Counters,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::with_config(InMemoryCacheConfig::default())
    }

    pub fn with_config(config: InMemoryCacheConfig) -> Self {
        Self {
            cache: MokaCache::builder()
                .max_capacity(config.max_capacity)
                .build(),
            counters: Counters::default(),
        }
    }

    fn expired_keys(&self, now: Instant) -> Vec<String> {
        self.cache
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.as_ref().clone())
            .collect()
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        match self.cache.get(key).await {
            Some(entry) if entry.is_expired(Instant::now()) => {
                self.cache.remove(key).await;
                Counters::bump(&self.counters.expirations, 1);
                Counters::bump(&self.counters.misses, 1);
                Ok(None)
            }
            Some(entry) => {
                Counters::bump(&self.counters.hits, 1);
                Ok(Some(entry.data))
            }
            None => {
                Counters::bump(&self.counters.misses, 1);
                Ok(None)
            }
        }
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let entry = CacheEntry {
            data: value.to_string(),
            expires_at: Instant::now().checked_add(ttl),
        };

        self.cache.insert(key.to_string(), entry).await;
        Counters::bump(&self.counters.sets, 1);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let existed = self.cache.remove(key).await.is_some();

        if existed {
            Counters::bump(&self.counters.deletes, 1);
        }

        Ok(existed)
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self
            .cache
            .get(key)
            .await
            .is_some_and(|entry| !entry.is_expired(Instant::now())))
    }

    async fn keys(&self) -> Result<Vec<String>, DomainError> {
        self.cache.run_pending_tasks().await;
        Ok(self.cache.iter().map(|(key, _)| key.as_ref().clone()).collect())
    }

    async fn purge_expired(&self) -> Result<usize, DomainError> {
        self.cache.run_pending_tasks().await;

        let expired = self.expired_keys(Instant::now());
        for key in &expired {
            self.cache.remove(key).await;
        }

        Counters::bump(&self.counters.expirations, expired.len() as u64);
        debug!(purged = expired.len(), "Purged expired cache entries");

        Ok(expired.len())
    }

    async fn size(&self) -> Result<usize, DomainError> {
        self.cache.run_pending_tasks().await;
        Ok(self.cache.entry_count() as usize)
    }

    fn metrics(&self) -> CacheMetrics {
        CacheMetrics {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            sets: self.counters.sets.load(Ordering::Relaxed),
            deletes: self.counters.deletes.load(Ordering::Relaxed),
            expirations: self.counters.expirations.load(Ordering::Relaxed),
            size: self.cache.entry_count(),
        }
    }

    fn reset_metrics(&self) {
        for counter in [
            &self.counters.hits,
            &self.counters.misses,
            &self.counters.sets,
            &self.counters.deletes,
            &self.counters.expirations,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
