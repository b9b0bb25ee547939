//! Bulk geodata reprocessing contracts

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

use crate::domain::geo::Coordinates;
use crate::domain::DomainError;

/// The slice of a stored event that reprocessing needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLocation {
    pub id: String,
    pub location_name: Option<String>,
}

impl EventLocation {
    pub fn new(id: impl Into<String>, location_name: Option<&str>) -> Self {
        Self {
            id: id.into(),
            location_name: location_name.map(str::to_string),
        }
    }

    /// Location name, if present and not blank
    pub fn name(&self) -> Option<&str> {
        self.location_name.as_deref().filter(|n| !n.is_empty())
    }
}

/// New geodata written back for an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeodataUpdate {
    pub lat: f64,
    pub lng: f64,
    /// `"lat,lon"` with full precision
    pub location_gps: String,
}

impl From<Coordinates> for GeodataUpdate {
    fn from(coordinates: Coordinates) -> Self {
        Self {
            lat: coordinates.lat,
            lng: coordinates.lon,
            location_gps: coordinates.to_gps_string(),
        }
    }
}

/// Destination for reprocessed geodata, usually the event store
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GeodataSink: Send + Sync {
    async fn update_geodata(&self, event_id: &str, update: GeodataUpdate)
        -> Result<(), DomainError>;
}

/// Counts from one reprocessing run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReprocessSummary {
    pub total: usize,
    pub updated: usize,
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_from_coordinates() {
        let update = GeodataUpdate::from(Coordinates::new(59.6355, 17.07875));

        assert_eq!(update.lat, 59.6355);
        assert_eq!(update.lng, 17.07875);
        assert_eq!(update.location_gps, "59.6355,17.07875");
    }

    #[test]
    fn test_blank_location_name() {
        assert_eq!(EventLocation::new("1", Some("")).name(), None);
        assert_eq!(EventLocation::new("2", None).name(), None);
        assert_eq!(EventLocation::new("3", Some("Kiruna")).name(), Some("Kiruna"));
    }
}
