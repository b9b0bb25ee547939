//! Geocoder contracts

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::geo::Coordinates;
use crate::domain::DomainError;

/// Remote geocoding service used as the fallback of last resort.
///
/// Implementations fail soft: transport, status and parse failures are
/// logged and reported as `None`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ExternalGeocoder: Send + Sync {
    /// Short identifier used in logs and metrics
    fn name(&self) -> &str;

    /// Looks up a normalized location name
    async fn geocode(&self, name: &str) -> Option<Coordinates>;
}

/// Anything that turns a location name into coordinates.
///
/// `Ok(None)` is a definitive miss; `Err` is a transient failure that a
/// caller may retry.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LocationResolver: Send + Sync {
    async fn try_resolve(&self, name: &str) -> Result<Option<Coordinates>, DomainError>;
}
