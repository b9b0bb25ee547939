//! Three-tier geocoding cache: successes, failures and normalized-name synonyms

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::cache::{Cache, CacheExt, CacheMetrics, CacheNamespace};
use crate::domain::geo::Coordinates;
use crate::domain::normalizer::simple_normalize;
use crate::domain::DomainError;

const DAY: u64 = 24 * 60 * 60;

/// TTL policy for the three namespaces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodingCacheConfig {
    pub success_ttl: Duration,
    /// Kept short so newly added places get retried
    pub failure_ttl: Duration,
    pub normalized_ttl: Duration,
}

impl Default for GeocodingCacheConfig {
    fn default() -> Self {
        Self {
            success_ttl: Duration::from_secs(30 * DAY),
            failure_ttl: Duration::from_secs(DAY),
            normalized_ttl: Duration::from_secs(90 * DAY),
        }
    }
}

impl GeocodingCacheConfig {
    pub fn with_success_ttl(mut self, ttl: Duration) -> Self {
        self.success_ttl = ttl;
        self
    }

    pub fn with_failure_ttl(mut self, ttl: Duration) -> Self {
        self.failure_ttl = ttl;
        self
    }

    pub fn with_normalized_ttl(mut self, ttl: Duration) -> Self {
        self.normalized_ttl = ttl;
        self
    }
}

/// Geocoding view of the shared cache
#[derive(Debug, Clone, Serialize)]
pub struct GeocodingCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub success_count: usize,
    pub failed_count: usize,
    pub normalized_count: usize,
    pub store: CacheMetrics,
    pub generated_at: DateTime<Utc>,
}

impl GeocodingCacheStats {
    pub fn total_keys(&self) -> usize {
        self.success_count + self.failed_count + self.normalized_count
    }
}

/// Namespaced reads and writes over a generic TTL [`Cache`].
///
/// Every key is the lowercased, trimmed input so lookups stay cheap and
/// stable before full normalization runs. Empty names are never stored.
#[derive(Debug)]
pub struct GeocodingCacheService {
    cache: Arc<dyn Cache>,
    config: GeocodingCacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl GeocodingCacheService {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self::with_config(cache, GeocodingCacheConfig::default())
    }

    pub fn with_config(cache: Arc<dyn Cache>, config: GeocodingCacheConfig) -> Self {
        Self {
            cache,
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &GeocodingCacheConfig {
        &self.config
    }

    /// The underlying store, shared with the purge daemon
    pub fn store(&self) -> Arc<dyn Cache> {
        self.cache.clone()
    }

    fn key(namespace: CacheNamespace, name: &str) -> Option<String> {
        let simple = simple_normalize(name);
        (!simple.is_empty()).then(|| namespace.key(&simple))
    }

    fn count<T>(&self, found: &Option<T>) {
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub async fn get_cached_result(&self, name: &str) -> Result<Option<Coordinates>, DomainError> {
        let Some(key) = Self::key(CacheNamespace::Success, name) else {
            return Ok(None);
        };

        let result: Option<Coordinates> = self.cache.get(&key).await?;
        self.count(&result);
        Ok(result)
    }

    pub async fn cache_result(&self, name: &str, result: Coordinates) -> Result<(), DomainError> {
        self.cache_result_with_ttl(name, result, self.config.success_ttl)
            .await
    }

    pub async fn cache_result_with_ttl(
        &self,
        name: &str,
        result: Coordinates,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        match Self::key(CacheNamespace::Success, name) {
            Some(key) => self.cache.set(&key, &result, ttl).await,
            None => Ok(()),
        }
    }

    /// Whether `name` failed to resolve within the failure TTL
    pub async fn get_cached_failure(&self, name: &str) -> Result<bool, DomainError> {
        let Some(key) = Self::key(CacheNamespace::Failure, name) else {
            return Ok(false);
        };

        let failed_at: Option<i64> = self.cache.get(&key).await?;
        self.count(&failed_at);
        Ok(failed_at.is_some())
    }

    /// Records a failed resolution; the stored value is the failure time in epoch millis
    pub async fn cache_failure(&self, name: &str) -> Result<(), DomainError> {
        self.cache_failure_with_ttl(name, self.config.failure_ttl)
            .await
    }

    pub async fn cache_failure_with_ttl(&self, name: &str, ttl: Duration) -> Result<(), DomainError> {
        match Self::key(CacheNamespace::Failure, name) {
            Some(key) => {
                let now = Utc::now().timestamp_millis();
                self.cache.set(&key, &now, ttl).await
            }
            None => Ok(()),
        }
    }

    pub async fn get_cached_normalized_name(
        &self,
        name: &str,
    ) -> Result<Option<String>, DomainError> {
        let Some(key) = Self::key(CacheNamespace::Normalized, name) else {
            return Ok(None);
        };

        let normalized: Option<String> = self.cache.get(&key).await?;
        self.count(&normalized);
        Ok(normalized)
    }

    pub async fn cache_normalized_name(
        &self,
        original: &str,
        normalized: &str,
    ) -> Result<(), DomainError> {
        self.cache_normalized_name_with_ttl(original, normalized, self.config.normalized_ttl)
            .await
    }

    pub async fn cache_normalized_name_with_ttl(
        &self,
        original: &str,
        normalized: &str,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        if normalized.is_empty() {
            return Ok(());
        }

        match Self::key(CacheNamespace::Normalized, original) {
            Some(key) => {
                self.cache.set(&key, &normalized, ttl).await
            }
            None => Ok(()),
        }
    }

    /// Drops every namespace entry for `name`, returning how many existed
    pub async fn invalidate(&self, name: &str) -> Result<usize, DomainError> {
        let mut removed = 0;

        for namespace in CacheNamespace::ALL {
            if let Some(key) = Self::key(namespace, name) {
                if self.cache.delete(&key).await? {
                    removed += 1;
                }
            }
        }

        Ok(removed)
    }

    pub async fn stats(&self) -> Result<GeocodingCacheStats, DomainError> {
        let mut stats = GeocodingCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            success_count: 0,
            failed_count: 0,
            normalized_count: 0,
            store: self.cache.metrics(),
            generated_at: Utc::now(),
        };

        for key in self.cache.keys().await? {
            match CacheNamespace::classify(&key) {
                Some(CacheNamespace::Success) => stats.success_count += 1,
                Some(CacheNamespace::Failure) => stats.failed_count += 1,
                Some(CacheNamespace::Normalized) => stats.normalized_count += 1,
                None => {}
            }
        }

        Ok(stats)
    }

    pub fn reset_stats(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.cache.reset_metrics();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockCache;

    fn service() -> (GeocodingCacheService, Arc<MockCache>) {
        let cache = Arc::new(MockCache::new());
        (GeocodingCacheService::new(cache.clone()), cache)
    }

    #[tokio::test]
    async fn test_result_roundtrip_uses_simple_key() {
        let (service, cache) = service();
        let coordinates = Coordinates::new(59.32938, 18.06871);

        service.cache_result("  Stockholm ", coordinates).await.unwrap();

        assert!(cache.exists("geocoding:stockholm").await.unwrap());
        assert_eq!(
            service.get_cached_result("STOCKHOLM").await.unwrap(),
            Some(coordinates)
        );
        assert_eq!(
            cache.ttl_of("geocoding:stockholm"),
            Some(Duration::from_secs(30 * DAY))
        );
    }

    #[tokio::test]
    async fn test_failure_namespace() {
        let (service, cache) = service();

        assert!(!service.get_cached_failure("Atlantis").await.unwrap());
        service.cache_failure("Atlantis").await.unwrap();

        assert!(service.get_cached_failure("atlantis").await.unwrap());
        assert_eq!(
            cache.ttl_of("geocoding:failed:atlantis"),
            Some(Duration::from_secs(DAY))
        );
        assert_eq!(service.get_cached_result("atlantis").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_normalized_namespace() {
        let (service, cache) = service();

        service
            .cache_normalized_name("I Göteborg", "göteborg")
            .await
            .unwrap();

        assert_eq!(
            service.get_cached_normalized_name("i göteborg").await.unwrap(),
            Some("göteborg".to_string())
        );
        assert_eq!(
            cache.ttl_of("geocoding:normalized:i göteborg"),
            Some(Duration::from_secs(90 * DAY))
        );
    }

    #[tokio::test]
    async fn test_explicit_ttls_override_defaults() {
        let (service, cache) = service();

        service
            .cache_failure_with_ttl("Atlantis", Duration::from_secs(60))
            .await
            .unwrap();
        service
            .cache_normalized_name_with_ttl("I Göteborg", "göteborg", Duration::from_secs(120))
            .await
            .unwrap();

        assert!(service.get_cached_failure("atlantis").await.unwrap());
        assert_eq!(
            cache.ttl_of("geocoding:failed:atlantis"),
            Some(Duration::from_secs(60))
        );
        assert_eq!(
            cache.ttl_of("geocoding:normalized:i göteborg"),
            Some(Duration::from_secs(120))
        );
    }

    #[tokio::test]
    async fn test_empty_names_are_ignored() {
        let (service, cache) = service();

        service.cache_result("   ", Coordinates::new(1.0, 2.0)).await.unwrap();
        service.cache_failure("").await.unwrap();
        service.cache_normalized_name("x", "").await.unwrap();

        assert_eq!(cache.size().await.unwrap(), 0);
        assert_eq!(service.get_cached_result("").await.unwrap(), None);
        assert!(!service.get_cached_failure("").await.unwrap());
    }

    #[tokio::test]
    async fn test_invalidate_clears_all_namespaces() {
        let (service, _) = service();

        service.cache_result("Lund", Coordinates::new(55.7, 13.2)).await.unwrap();
        service.cache_failure("Lund").await.unwrap();
        service.cache_normalized_name("Lund", "lund stad").await.unwrap();

        assert_eq!(service.invalidate("Lund").await.unwrap(), 3);
        assert_eq!(service.invalidate("Lund").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_stats_counts_namespaces_and_lookups() {
        let (service, _) = service();

        service.cache_result("Lund", Coordinates::new(55.7, 13.2)).await.unwrap();
        service.cache_result("Ystad", Coordinates::new(55.4, 13.8)).await.unwrap();
        service.cache_failure("Atlantis").await.unwrap();
        service.cache_normalized_name("I Lund", "lund").await.unwrap();

        service.get_cached_result("Lund").await.unwrap();
        service.get_cached_result("Malmö").await.unwrap();

        let stats = service.stats().await.unwrap();
        assert_eq!(stats.success_count, 2);
        assert_eq!(stats.failed_count, 1);
        assert_eq!(stats.normalized_count, 1);
        assert_eq!(stats.total_keys(), 4);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);

        service.reset_stats();
        let stats = service.stats().await.unwrap();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.store.hits, 0);
    }

    #[tokio::test]
    async fn test_backend_errors_propagate() {
        let cache = Arc::new(MockCache::new().with_error("backend down"));
        let service = GeocodingCacheService::new(cache);

        assert!(service.get_cached_result("Lund").await.is_err());
    }
}
