//! Domain layer - Core resolution logic and entities

pub mod cache;
pub mod error;
pub mod geo;
pub mod geocoding;
pub mod location_index;
pub mod normalizer;

pub use cache::{Cache, CacheExt, CacheMetrics, CacheNamespace};
pub use error::DomainError;
pub use geo::{Coordinates, Gazetteer, GazetteerEntry};
pub use geocoding::{
    BatchOptions, BatchResult, BatchSummary, EventLocation, ExternalGeocoder, GeodataSink,
    GeodataUpdate, LocationResolver, ReprocessSummary,
};
pub use location_index::{IndexConfig, LocationIndex, SearchOptions};
pub use normalizer::Normalizer;
