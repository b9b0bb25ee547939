use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::domain::geo::Gazetteer;
use crate::domain::geocoding::BatchOptions;
use crate::domain::location_index::{
    FuzzyCandidates, IndexConfig, SearchOptions, DEFAULT_FUZZY_THRESHOLD, DEFAULT_PREFIX_LENGTH,
};
use crate::domain::DomainError;
use crate::infrastructure::geocoder::{
    NominatimConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};
use crate::infrastructure::services::GeocodingCacheConfig;

const DAY_SECS: u64 = 24 * 60 * 60;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub gazetteer: GazetteerConfig,
    pub index: IndexSettings,
    pub nominatim: NominatimSettings,
    pub cache: CacheSettings,
    pub batch: BatchOptions,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Where the gazetteer comes from; the built-in table when `path` is unset
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GazetteerConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub prefix_length: usize,
    pub fuzzy_threshold: usize,
    pub fuzzy_candidates: FuzzyCandidates,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NominatimSettings {
    pub enabled: bool,
    pub base_url: String,
    pub user_agent: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub max_capacity: u64,
    /// Zero disables the purge daemon
    pub purge_interval_secs: u64,
    pub success_ttl_secs: u64,
    pub failure_ttl_secs: u64,
    pub normalized_ttl_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            prefix_length: DEFAULT_PREFIX_LENGTH,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            fuzzy_candidates: FuzzyCandidates::default(),
        }
    }
}

impl Default for NominatimSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_capacity: 100_000,
            purge_interval_secs: 300,
            success_ttl_secs: 30 * DAY_SECS,
            failure_ttl_secs: DAY_SECS,
            normalized_ttl_secs: 90 * DAY_SECS,
        }
    }
}

impl GazetteerConfig {
    /// Reads the configured file, or the built-in table when no path is set
    pub fn load(&self) -> Result<Gazetteer, DomainError> {
        match &self.path {
            Some(path) => {
                info!(path = %path.display(), "Loading gazetteer from file");
                Gazetteer::from_path(path)
            }
            None => Gazetteer::builtin(),
        }
    }
}

impl IndexSettings {
    pub fn index_config(&self) -> IndexConfig {
        IndexConfig::default()
            .with_prefix_length(self.prefix_length)
            .with_fuzzy_candidates(self.fuzzy_candidates)
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions::default().with_fuzzy_threshold(self.fuzzy_threshold)
    }
}

impl NominatimSettings {
    pub fn client_config(&self) -> NominatimConfig {
        NominatimConfig::default()
            .with_base_url(&self.base_url)
            .with_user_agent(&self.user_agent)
            .with_timeout(Duration::from_millis(self.timeout_ms))
    }
}

impl CacheSettings {
    pub fn ttl_config(&self) -> GeocodingCacheConfig {
        GeocodingCacheConfig::default()
            .with_success_ttl(Duration::from_secs(self.success_ttl_secs))
            .with_failure_ttl(Duration::from_secs(self.failure_ttl_secs))
            .with_normalized_ttl(Duration::from_secs(self.normalized_ttl_secs))
    }

    pub fn purge_interval(&self) -> Option<Duration> {
        (self.purge_interval_secs > 0).then(|| Duration::from_secs(self.purge_interval_secs))
    }
}

impl AppConfig {
    /// Layers `config/default`, `config/local` and `APP__*` variables.
    ///
    /// A source that is present but malformed is an error, never a
    /// silent fall back to defaults.
    pub fn load() -> Result<Self, DomainError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to read configuration: {}", e)))?;

        config
            .try_deserialize()
            .map_err(|e| DomainError::configuration(format!("Invalid configuration: {}", e)))
    }

    /// Rejects settings the engine cannot run with
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.index.prefix_length == 0 {
            return Err(DomainError::configuration("index.prefix_length must be at least 1"));
        }

        if self.batch.concurrency == 0 {
            return Err(DomainError::configuration("batch.concurrency must be at least 1"));
        }

        if self.batch.timeout_ms == 0 {
            return Err(DomainError::configuration("batch.timeout_ms must be positive"));
        }

        if self.nominatim.enabled {
            if self.nominatim.timeout_ms == 0 {
                return Err(DomainError::configuration("nominatim.timeout_ms must be positive"));
            }

            if self.nominatim.base_url.trim().is_empty() {
                return Err(DomainError::configuration("nominatim.base_url cannot be empty"));
            }

            if self.nominatim.user_agent.trim().is_empty() {
                return Err(DomainError::configuration("nominatim.user_agent cannot be empty"));
            }
        }

        Ok(())
    }
}
