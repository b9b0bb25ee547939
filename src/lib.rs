//! Polis geocoder
//!
//! Resolves noisy Swedish police-report location names to coordinates:
//! - Normalization of locative phrases, incident prefixes and ASCII-folded spellings
//! - Exact, prefix, county and fuzzy lookups over a curated gazetteer
//! - Three-tier TTL cache for successes, failures and name synonyms
//! - Nominatim fallback and paced batch resolution

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use domain::cache::Cache;
use domain::geo::{Coordinates, Gazetteer};
use domain::geocoding::{BatchOptions, BatchResult, ExternalGeocoder};
use domain::location_index::{IndexConfig, LocationIndex, SearchOptions};
use domain::DomainError;
use infrastructure::cache::{CachePurgeDaemon, InMemoryCache, InMemoryCacheConfig};
use infrastructure::geocoder::NominatimClient;
use infrastructure::services::{
    BatchResolver, GeocodingCacheConfig, GeocodingCacheService, GeocodingResolver,
};
use tracing::{info, warn};

/// Everything the resolution engine needs, built once at startup.
///
/// The gazetteer-derived index is immutable after construction; the
/// cache is the only shared mutable state.
pub struct GeocodingContext {
    index: Arc<LocationIndex>,
    cache: Arc<GeocodingCacheService>,
    resolver: Arc<GeocodingResolver>,
    batch_options: BatchOptions,
    purge_daemon: Option<CachePurgeDaemon>,
}

impl std::fmt::Debug for GeocodingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodingContext")
            .field("index_entries", &self.index.len())
            .field("batch_options", &self.batch_options)
            .field("purge_daemon", &self.purge_daemon.is_some())
            .finish()
    }
}

impl GeocodingContext {
    pub fn builder() -> GeocodingContextBuilder {
        GeocodingContextBuilder::default()
    }

    /// Validates `config` and wires the engine it describes.
    ///
    /// Starts the cache purge daemon when called inside a tokio runtime.
    pub fn from_config(config: &AppConfig) -> Result<Self, DomainError> {
        config.validate()?;

        let gazetteer = config.gazetteer.load()?;

        let mut builder = Self::builder()
            .gazetteer(gazetteer)
            .index_config(config.index.index_config())
            .search_options(config.index.search_options())
            .cache_capacity(config.cache.max_capacity)
            .cache_config(config.cache.ttl_config())
            .purge_interval(config.cache.purge_interval())
            .batch_options(config.batch.clone());

        if config.nominatim.enabled {
            let client = NominatimClient::new(config.nominatim.client_config())?;
            builder = builder.external(Arc::new(client));
        }

        builder.build()
    }

    pub fn resolver(&self) -> Arc<GeocodingResolver> {
        self.resolver.clone()
    }

    pub fn batch(&self) -> BatchResolver {
        BatchResolver::new(self.resolver.clone())
    }

    pub fn index(&self) -> Arc<LocationIndex> {
        self.index.clone()
    }

    pub fn cache(&self) -> Arc<GeocodingCacheService> {
        self.cache.clone()
    }

    /// Batch settings from configuration
    pub fn batch_options(&self) -> &BatchOptions {
        &self.batch_options
    }

    pub async fn resolve(&self, name: &str) -> Option<Coordinates> {
        self.resolver.resolve(name).await
    }

    /// Batch resolution with the configured options
    pub async fn batch_resolve(&self, names: &[String]) -> Vec<BatchResult> {
        self.batch().batch_resolve(names, &self.batch_options).await
    }

    pub fn is_purging(&self) -> bool {
        self.purge_daemon
            .as_ref()
            .is_some_and(CachePurgeDaemon::is_running)
    }
}

/// Assembles a [`GeocodingContext`] from parts; unset parts use defaults
#[derive(Default)]
pub struct GeocodingContextBuilder {
    gazetteer: Option<Gazetteer>,
    index_config: IndexConfig,
    search_options: SearchOptions,
    store: Option<Arc<dyn Cache>>,
    cache_capacity: Option<u64>,
    cache_config: GeocodingCacheConfig,
    external: Option<Arc<dyn ExternalGeocoder>>,
    purge_interval: Option<Duration>,
    batch_options: BatchOptions,
}

impl GeocodingContextBuilder {
    pub fn gazetteer(mut self, gazetteer: Gazetteer) -> Self {
        self.gazetteer = Some(gazetteer);
        self
    }

    pub fn index_config(mut self, config: IndexConfig) -> Self {
        self.index_config = config;
        self
    }

    pub fn search_options(mut self, options: SearchOptions) -> Self {
        self.search_options = options;
        self
    }

    /// Uses an existing store instead of a fresh in-memory one
    pub fn store(mut self, store: Arc<dyn Cache>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }

    pub fn cache_config(mut self, config: GeocodingCacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    pub fn external(mut self, external: Arc<dyn ExternalGeocoder>) -> Self {
        self.external = Some(external);
        self
    }

    pub fn purge_interval(mut self, interval: Option<Duration>) -> Self {
        self.purge_interval = interval;
        self
    }

    pub fn batch_options(mut self, options: BatchOptions) -> Self {
        self.batch_options = options;
        self
    }

    pub fn build(self) -> Result<GeocodingContext, DomainError> {
        let gazetteer = match self.gazetteer {
            Some(gazetteer) => gazetteer,
            None => Gazetteer::builtin()?,
        };

        let index = Arc::new(LocationIndex::build(&gazetteer, self.index_config));

        let store = self.store.unwrap_or_else(|| {
            let mut config = InMemoryCacheConfig::default();
            if let Some(capacity) = self.cache_capacity {
                config = config.with_max_capacity(capacity);
            }
            Arc::new(InMemoryCache::with_config(config))
        });

        let purge_daemon = self.purge_interval.and_then(|interval| {
            if tokio::runtime::Handle::try_current().is_err() {
                warn!("No tokio runtime; cache purge daemon not started");
                return None;
            }
            Some(CachePurgeDaemon::start(store.clone(), interval))
        });

        let cache = Arc::new(GeocodingCacheService::with_config(store, self.cache_config));

        let mut resolver = GeocodingResolver::new(index.clone(), cache.clone())
            .with_search_options(self.search_options);
        if let Some(external) = self.external {
            resolver = resolver.with_external(external);
        }

        info!(
            entries = gazetteer.len(),
            external = resolver.has_external(),
            "Geocoding context ready"
        );

        Ok(GeocodingContext {
            index,
            cache,
            resolver: Arc::new(resolver),
            batch_options: self.batch_options,
            purge_daemon,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geo::GazetteerEntry;
    use crate::domain::geocoding::MockExternalGeocoder;

    fn small_gazetteer() -> Gazetteer {
        Gazetteer::from_entries(vec![
            GazetteerEntry::new("visby", 57.6348, 18.29439),
            GazetteerEntry::new("gotlands län", 57.5, 18.5),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_builder_with_custom_gazetteer() {
        let context = GeocodingContext::builder()
            .gazetteer(small_gazetteer())
            .build()
            .unwrap();

        assert_eq!(
            context.resolve("I Visby").await,
            Some(Coordinates::new(57.6348, 18.29439))
        );
        assert_eq!(context.resolve("Stockholm").await, None);
    }

    #[tokio::test]
    async fn test_contexts_are_isolated() {
        let first = GeocodingContext::builder()
            .gazetteer(small_gazetteer())
            .build()
            .unwrap();
        let second = GeocodingContext::builder().build().unwrap();

        assert_eq!(first.resolve("Stockholm").await, None);
        assert!(second.resolve("Stockholm").await.is_some());
    }

    #[tokio::test]
    async fn test_external_wired_through_builder() {
        let mut external = MockExternalGeocoder::new();
        external.expect_name().return_const("mock".to_string());
        external
            .expect_geocode()
            .times(1)
            .returning(|_| Some(Coordinates::new(1.0, 2.0)));

        let context = GeocodingContext::builder()
            .gazetteer(small_gazetteer())
            .external(Arc::new(external))
            .build()
            .unwrap();

        assert_eq!(
            context.resolve("Långtbortistan").await,
            Some(Coordinates::new(1.0, 2.0))
        );
    }

    #[tokio::test]
    async fn test_batch_uses_configured_options() {
        let context = GeocodingContext::builder()
            .gazetteer(small_gazetteer())
            .batch_options(BatchOptions::default().with_concurrency(1).with_delay_ms(0))
            .build()
            .unwrap();

        let names = vec!["Visby".to_string(), "Visby".to_string(), "Atlantis".to_string()];
        let results = context.batch_resolve(&names).await;

        assert_eq!(context.batch_options().concurrency, 1);
        assert_eq!(results.len(), 2);
        assert!(results[0].success);
        assert!(!results[1].success);
    }

    #[tokio::test]
    async fn test_from_config_without_network() {
        let mut config = AppConfig::default();
        config.nominatim.enabled = false;

        let context = GeocodingContext::from_config(&config).unwrap();

        assert!(context.is_purging());
        assert!(context.resolve("Göteborg").await.is_some());
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let mut config = AppConfig::default();
        config.batch.concurrency = 0;

        assert!(GeocodingContext::from_config(&config).is_err());
    }

    #[test]
    fn test_from_config_missing_gazetteer_file() {
        let mut config = AppConfig::default();
        config.nominatim.enabled = false;
        config.gazetteer.path = Some("/nonexistent/gazetteer.json".into());

        assert!(matches!(
            GeocodingContext::from_config(&config),
            Err(DomainError::Configuration { .. })
        ));
    }

    #[test]
    fn test_build_outside_runtime_skips_daemon() {
        let context = GeocodingContext::builder()
            .gazetteer(small_gazetteer())
            .purge_interval(Some(Duration::from_secs(60)))
            .build()
            .unwrap();

        assert!(!context.is_purging());
    }
}
