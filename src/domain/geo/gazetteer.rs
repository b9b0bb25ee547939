//! Gazetteer - the static table of Swedish place names and their coordinates

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Coordinates;
use crate::domain::DomainError;

/// Built-in gazetteer shipped with the crate
const BUILTIN_GAZETTEER: &str = include_str!("../../../data/gazetteer.json");

/// County seats used as a last local fallback for `"<county> län"` lookups
pub const COUNTY_CENTROIDS: &[(&str, f64, f64)] = &[
    ("stockholms län", 59.32938, 18.06871),
    ("västra götalands län", 57.70887, 11.97456),
    ("skåne län", 55.60587, 13.00073),
    ("östergötlands län", 58.41086, 15.62157),
    ("jönköpings län", 57.78145, 14.15618),
    ("uppsala län", 59.85882, 17.63889),
    ("västmanlands län", 59.61617, 16.55276),
    ("örebro län", 59.27412, 15.2066),
    ("södermanlands län", 59.19554, 17.62525),
    ("gävleborgs län", 60.67452, 17.14174),
    ("värmlands län", 59.4022, 13.51149),
    ("kronobergs län", 56.87767, 14.80906),
    ("dalarnas län", 60.60357, 15.62597),
    ("hallands län", 56.67446, 12.85676),
    ("kalmar län", 56.66157, 16.36163),
    ("västernorrlands län", 62.39129, 17.3063),
    ("västerbottens län", 64.75067, 20.95279),
    ("norrbottens län", 65.58415, 22.15465),
    ("jämtlands län", 63.17824, 14.63566),
    ("blekinge län", 56.16156, 15.58661),
    ("gotlands län", 57.6348, 18.29439),
];

/// Looks up a county centroid by its full `"<county> län"` name
pub fn county_centroid(name: &str) -> Option<Coordinates> {
    COUNTY_CENTROIDS
        .iter()
        .find(|(county, _, _)| *county == name)
        .map(|(_, lat, lon)| Coordinates::new(*lat, *lon))
}

/// A single named place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GazetteerEntry {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl GazetteerEntry {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

/// Ordered, immutable collection of gazetteer entries.
///
/// Order matters: when two entries share a name, the later one wins
/// during index construction.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    entries: Vec<GazetteerEntry>,
}

impl Gazetteer {
    /// Loads the gazetteer compiled into the binary
    pub fn builtin() -> Result<Self, DomainError> {
        Self::from_json(BUILTIN_GAZETTEER)
    }

    /// Loads a gazetteer from a JSON file containing an array of `{name, lat, lon}`
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            DomainError::configuration(format!(
                "Failed to read gazetteer '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_json(&json)
    }

    /// Parses a gazetteer from a JSON array of `{name, lat, lon}`
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        let entries: Vec<GazetteerEntry> = serde_json::from_str(json).map_err(|e| {
            DomainError::configuration(format!("Failed to parse gazetteer: {}", e))
        })?;

        Self::from_entries(entries)
    }

    /// Builds a gazetteer from entries, lowercasing and trimming names
    pub fn from_entries(entries: Vec<GazetteerEntry>) -> Result<Self, DomainError> {
        let entries = entries
            .into_iter()
            .map(|entry| {
                let name = entry.name.trim().to_lowercase();

                if name.is_empty() {
                    return Err(DomainError::configuration(
                        "Gazetteer entry with empty name",
                    ));
                }

                if !entry.coordinates().is_valid() {
                    return Err(DomainError::configuration(format!(
                        "Gazetteer entry '{}' has non-finite coordinates",
                        name
                    )));
                }

                Ok(GazetteerEntry { name, ..entry })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[GazetteerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
