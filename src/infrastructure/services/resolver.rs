//! Location name resolver - cache, local index and external fallback

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use super::GeocodingCacheService;
use crate::domain::geo::{county_centroid, Coordinates};
use crate::domain::geocoding::{ExternalGeocoder, LocationResolver};
use crate::domain::location_index::{LocationIndex, SearchOptions};
use crate::domain::normalizer::{simple_normalize, Normalizer};
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_resolution, ResolutionSource};

static SEGMENT_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r",|\sin\s").unwrap());

/// Turns free-form location names into coordinates.
///
/// Lookups run cheapest first: cached result, cached failure, cached
/// normalized alias, local index, comma segments, external geocoder.
/// Every outcome is written back so repeated calls stay local.
pub struct GeocodingResolver {
    index: Arc<LocationIndex>,
    normalizer: Normalizer,
    cache: Arc<GeocodingCacheService>,
    external: Option<Arc<dyn ExternalGeocoder>>,
    search: SearchOptions,
}

impl std::fmt::Debug for GeocodingResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodingResolver")
            .field("index_entries", &self.index.len())
            .field("external", &self.external.as_ref().map(|e| e.name().to_string()))
            .field("search", &self.search)
            .finish()
    }
}

/// Logs a cache backend fault and degrades it to a miss
fn soft<T: Default>(result: Result<T, DomainError>, operation: &str) -> T {
    result.unwrap_or_else(|e| {
        warn!(operation, error = %e, "Geocoding cache unavailable");
        T::default()
    })
}

impl GeocodingResolver {
    pub fn new(index: Arc<LocationIndex>, cache: Arc<GeocodingCacheService>) -> Self {
        Self {
            normalizer: Normalizer::new(index.clone()),
            index,
            cache,
            external: None,
            search: SearchOptions::default(),
        }
    }

    pub fn with_external(mut self, external: Arc<dyn ExternalGeocoder>) -> Self {
        self.external = Some(external);
        self
    }

    pub fn with_search_options(mut self, search: SearchOptions) -> Self {
        self.search = search;
        self
    }

    pub fn has_external(&self) -> bool {
        self.external.is_some()
    }

    pub fn index(&self) -> &LocationIndex {
        &self.index
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn cache(&self) -> &GeocodingCacheService {
        &self.cache
    }

    /// Resolves `raw` to coordinates. Never fails: misses and backend
    /// faults both come back as `None`.
    pub async fn resolve(&self, raw: &str) -> Option<Coordinates> {
        if raw.trim().is_empty() {
            return None;
        }

        if let Some(hit) = soft(self.cache.get_cached_result(raw).await, "get_result") {
            debug!(name = raw, "Geocoding cache hit");
            record_resolution(ResolutionSource::Cache);
            return Some(hit);
        }

        if soft(self.cache.get_cached_failure(raw).await, "get_failure") {
            debug!(name = raw, "Geocoding negative cache hit");
            record_resolution(ResolutionSource::NegativeCache);
            return None;
        }

        let normalized = self.normalize_cached(raw).await;
        let has_alias = normalized != simple_normalize(raw);

        if has_alias {
            if let Some(hit) = soft(self.cache.get_cached_result(&normalized).await, "get_alias") {
                debug!(name = raw, normalized = %normalized, "Geocoding alias cache hit");
                self.remember(raw, &normalized, hit).await;
                record_resolution(ResolutionSource::Cache);
                return Some(hit);
            }
        }

        if normalized.is_empty() {
            debug!(name = raw, "Name normalizes to nothing");
            self.forget(raw).await;
            record_resolution(ResolutionSource::Miss);
            return None;
        }

        if let Some(hit) = self.lookup_local(&normalized) {
            debug!(name = raw, normalized = %normalized, "Found in location index");
            self.remember(raw, &normalized, hit).await;
            record_resolution(ResolutionSource::LocalIndex);
            return Some(hit);
        }

        if let Some(hit) = self.lookup_segments(&normalized) {
            self.remember(raw, &normalized, hit).await;
            record_resolution(ResolutionSource::Segment);
            return Some(hit);
        }

        if let Some(external) = &self.external {
            debug!(name = raw, normalized = %normalized, provider = external.name(), "Falling back to external geocoder");

            if let Some(hit) = external.geocode(&normalized).await {
                self.remember(raw, &normalized, hit).await;
                record_resolution(ResolutionSource::External);
                return Some(hit);
            }
        }

        self.forget(raw).await;
        record_resolution(ResolutionSource::Miss);
        None
    }

    /// Full normalization, memoised in the synonym namespace when it
    /// differs from the lowercase/trim key
    pub async fn normalize_cached(&self, raw: &str) -> String {
        if let Some(cached) = soft(self.cache.get_cached_normalized_name(raw).await, "get_normalized") {
            return cached;
        }

        let normalized = self.normalizer.normalize(raw);

        if !normalized.is_empty() && normalized != simple_normalize(raw) {
            soft(
                self.cache.cache_normalized_name(raw, &normalized).await,
                "set_normalized",
            );
        }

        normalized
    }

    /// Index search with county fallbacks, no I/O
    pub fn lookup_local(&self, name: &str) -> Option<Coordinates> {
        if let Some(entry) = self.index.find_location(name, self.search) {
            return Some(entry.coordinates());
        }

        if let Some(entry) = self.index.find_by_county(name).first() {
            return Some(entry.coordinates());
        }

        county_centroid(name).or_else(|| county_centroid(&format!("{} län", name)))
    }

    /// Tries each comma / " in " segment from last to first
    fn lookup_segments(&self, normalized: &str) -> Option<Coordinates> {
        let segments: Vec<&str> = SEGMENT_SEPARATOR.split(normalized).collect();

        if segments.len() < 2 {
            return None;
        }

        segments
            .iter()
            .rev()
            .map(|segment| segment.trim())
            .filter(|segment| !segment.is_empty())
            .find_map(|segment| {
                let hit = self.lookup_local(segment);
                if hit.is_some() {
                    debug!(segment, "Found segment in location index");
                }
                hit
            })
    }

    async fn remember(&self, raw: &str, normalized: &str, hit: Coordinates) {
        soft(self.cache.cache_result(raw, hit).await, "set_result");

        if simple_normalize(raw) != normalized {
            soft(self.cache.cache_result(normalized, hit).await, "set_alias");
        }
    }

    async fn forget(&self, raw: &str) {
        soft(self.cache.cache_failure(raw).await, "set_failure");
    }
}

#[async_trait]
impl LocationResolver for GeocodingResolver {
    async fn try_resolve(&self, name: &str) -> Result<Option<Coordinates>, DomainError> {
        Ok(self.resolve(name).await)
    }
}
