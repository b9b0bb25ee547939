//! Infrastructure services

mod batch;
mod geocoding_cache;
mod resolver;

pub use batch::BatchResolver;
pub use geocoding_cache::{GeocodingCacheConfig, GeocodingCacheService, GeocodingCacheStats};
pub use resolver::GeocodingResolver;
