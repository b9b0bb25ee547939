//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, CacheSettings, GazetteerConfig, IndexSettings, LogFormat, LoggingConfig,
    MetricsConfig, NominatimSettings,
};
