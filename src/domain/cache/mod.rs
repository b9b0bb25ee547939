//! Cache domain - TTL key-value abstraction shared by the geocoding tiers

mod key;
mod metrics;
mod repository;

pub use key::CacheNamespace;
pub use metrics::CacheMetrics;
pub use repository::{Cache, CacheExt};

#[cfg(test)]
pub use repository::mock::MockCache;
