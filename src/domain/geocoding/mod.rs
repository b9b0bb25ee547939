//! Geocoding contracts - external geocoder, resolver, batch and reprocessing types

mod batch;
mod geocoder;
mod reprocess;

pub use batch::{
    BatchOptions, BatchResult, BatchSummary, DEFAULT_CONCURRENCY, DEFAULT_DELAY_MS,
    DEFAULT_RETRIES, DEFAULT_RETRY_DELAY_MS, DEFAULT_TIMEOUT_MS,
};
pub use geocoder::{ExternalGeocoder, LocationResolver};
pub use reprocess::{EventLocation, GeodataSink, GeodataUpdate, ReprocessSummary};

#[cfg(test)]
pub use geocoder::{MockExternalGeocoder, MockLocationResolver};
#[cfg(test)]
pub use reprocess::MockGeodataSink;
