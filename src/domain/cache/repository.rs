//! Cache trait definition

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use super::CacheMetrics;
use crate::domain::DomainError;

/// Key-value store with per-entry TTL
///
/// Values are JSON strings so the trait stays dyn-compatible.
/// Use [`CacheExt`] for typed get/set operations.
#[async_trait]
pub trait Cache: Send + Sync + Debug {
    /// Gets a raw JSON value; expired entries read as absent
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Stores a raw JSON value, replacing any previous value and TTL
    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError>;

    /// Removes a key, returning whether it was present
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    /// Checks if a live entry exists for the key
    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.get_raw(key).await?.is_some())
    }

    /// Lists keys of entries currently held, including not-yet-purged expired ones
    async fn keys(&self) -> Result<Vec<String>, DomainError>;

    /// Removes every expired entry, returning how many were removed
    async fn purge_expired(&self) -> Result<usize, DomainError>;

    /// Number of entries currently held
    async fn size(&self) -> Result<usize, DomainError>;

    /// Snapshot of the store's counters
    fn metrics(&self) -> CacheMetrics;

    /// Zeroes the counters, leaving entries untouched
    fn reset_metrics(&self);
}

/// Extension trait providing typed get/set operations
pub trait CacheExt: Cache {
    /// Gets a typed value from the cache
    fn get<'a, V>(
        &'a self,
        key: &'a str,
    ) -> impl std::future::Future<Output = Result<Option<V>, DomainError>> + Send
    where
        V: DeserializeOwned + Send,
    {
        async move {
            match self.get_raw(key).await? {
                Some(data) => {
                    let value: V = serde_json::from_str(&data).map_err(|e| {
                        DomainError::cache(format!("Failed to deserialize cache value: {}", e))
                    })?;
                    Ok(Some(value))
                }
                None => Ok(None),
            }
        }
    }

    /// Sets a typed value with a TTL. Values serializing to JSON `null`
    /// are not stored, since they would be indistinguishable from a miss.
    fn set<'a, V>(
        &'a self,
        key: &'a str,
        value: &'a V,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<(), DomainError>> + Send
    where
        V: Serialize + Send + Sync,
    {
        async move {
            let data = serde_json::to_string(value).map_err(|e| {
                DomainError::cache(format!("Failed to serialize cache value: {}", e))
            })?;

            if data == "null" {
                return Ok(());
            }

            self.set_raw(key, &data, ttl).await
        }
    }
}

// Blanket implementation for all types implementing Cache
impl<T: Cache + ?Sized> CacheExt for T {}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock cache for testing; TTLs are recorded but never enforced
    #[derive(Debug)]
    pub struct MockCache {
        entries: Mutex<HashMap<String, (String, Duration)>>,
        error: Mutex<Option<String>>,
        metrics: Mutex<CacheMetrics>,
    }

    impl Default for MockCache {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockCache {
        pub fn new() -> Self {
            Self {
                entries: Mutex::new(HashMap::new()),
                error: Mutex::new(None),
                metrics: Mutex::new(CacheMetrics::default()),
            }
        }

        pub fn with_entry<V: Serialize>(self, key: &str, value: &V, ttl: Duration) -> Self {
            let json = serde_json::to_string(value).unwrap();
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (json, ttl));
            self
        }

        pub fn with_error(self, error: impl Into<String>) -> Self {
            *self.error.lock().unwrap() = Some(error.into());
            self
        }

        /// TTL the key was last stored with
        pub fn ttl_of(&self, key: &str) -> Option<Duration> {
            self.entries.lock().unwrap().get(key).map(|(_, ttl)| *ttl)
        }

        fn check_error(&self) -> Result<(), DomainError> {
            if let Some(error) = self.error.lock().unwrap().clone() {
                return Err(DomainError::cache(error));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Cache for MockCache {
        async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
            self.check_error()?;
            let value = self
                .entries
                .lock()
                .unwrap()
                .get(key)
                .map(|(json, _)| json.clone());

            let mut metrics = self.metrics.lock().unwrap();
            if value.is_some() {
                metrics.hits += 1;
            } else {
                metrics.misses += 1;
            }

            Ok(value)
        }

        async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
            self.check_error()?;
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (value.to_string(), ttl));
            self.metrics.lock().unwrap().sets += 1;
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<bool, DomainError> {
            self.check_error()?;
            let removed = self.entries.lock().unwrap().remove(key).is_some();
            if removed {
                self.metrics.lock().unwrap().deletes += 1;
            }
            Ok(removed)
        }

        async fn keys(&self) -> Result<Vec<String>, DomainError> {
            self.check_error()?;
            Ok(self.entries.lock().unwrap().keys().cloned().collect())
        }

        async fn purge_expired(&self) -> Result<usize, DomainError> {
            self.check_error()?;
            Ok(0)
        }

        async fn size(&self) -> Result<usize, DomainError> {
            self.check_error()?;
            Ok(self.entries.lock().unwrap().len())
        }

        fn metrics(&self) -> CacheMetrics {
            let mut snapshot = *self.metrics.lock().unwrap();
            snapshot.size = self.entries.lock().unwrap().len() as u64;
            snapshot
        }

        fn reset_metrics(&self) {
            *self.metrics.lock().unwrap() = CacheMetrics::default();
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_cache_set_get() {
            let cache = MockCache::new();
            cache
                .set("key1", &"value1", Duration::from_secs(60))
                .await
                .unwrap();

            let result: Option<String> = cache.get("key1").await.unwrap();
            assert_eq!(result, Some("value1".to_string()));
            assert_eq!(cache.ttl_of("key1"), Some(Duration::from_secs(60)));
        }

        #[tokio::test]
        async fn test_mock_cache_get_missing() {
            let cache = MockCache::new();

            let result: Option<String> = cache.get("missing").await.unwrap();
            assert!(result.is_none());
            assert_eq!(cache.metrics().misses, 1);
        }

        #[tokio::test]
        async fn test_set_skips_null() {
            let cache = MockCache::new();
            let nothing: Option<String> = None;

            cache
                .set("key", &nothing, Duration::from_secs(60))
                .await
                .unwrap();

            assert!(!cache.exists("key").await.unwrap());
            assert_eq!(cache.metrics().sets, 0);
        }

        #[tokio::test]
        async fn test_mock_cache_delete() {
            let cache = MockCache::new();
            cache
                .set("key1", &"value1", Duration::from_secs(60))
                .await
                .unwrap();

            assert!(cache.delete("key1").await.unwrap());
            assert!(!cache.delete("key1").await.unwrap());

            let result: Option<String> = cache.get("key1").await.unwrap();
            assert!(result.is_none());
            assert_eq!(cache.metrics().deletes, 1);
        }

        #[tokio::test]
        async fn test_mock_cache_with_error() {
            let cache = MockCache::new().with_error("Test error");

            let result: Result<Option<String>, _> = cache.get("key").await;
            assert!(result.is_err());
        }

        #[tokio::test]
        async fn test_reset_metrics_keeps_entries() {
            let cache = MockCache::new().with_entry("k", &1, Duration::from_secs(1));
            let _: Option<i32> = cache.get("k").await.unwrap();

            cache.reset_metrics();

            let metrics = cache.metrics();
            assert_eq!(metrics.hits, 0);
            assert_eq!(metrics.size, 1);
        }
    }
}
