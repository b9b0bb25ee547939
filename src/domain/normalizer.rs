//! Location name normalizer
//!
//! Turns police-report style location strings ("i Göteborg",
//! "Trafikolycka, Enköping", "Malmoe stad") into the lowercase canonical
//! keys used by the location index.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use super::location_index::{LocationIndex, DEFAULT_FUZZY_THRESHOLD};

static LOCATIVE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(i närheten av|i|på|vid|nära)\s+(.+)$").unwrap());

static ADMINISTRATIVE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+(kommun|län|stad|region|landskap)$").unwrap());

static INCIDENT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(trafikolycka|misshandel|bedrägeri|stöld|brand|knivlagen|rån|inbrott),?\s+")
        .unwrap()
});

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\-–—]+").unwrap());

static TRAILING_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+(\w+)$").unwrap());

/// ASCII-folded spellings and their correct Swedish forms
const TRANSLITERATIONS: &[(&str, &str)] = &[
    ("vaexjoe", "växjö"),
    ("vaeckelsaang", "väckelsång"),
    ("goeteborg", "göteborg"),
    ("malmoe", "malmö"),
    ("oerebro", "örebro"),
    ("aengelholm", "ängelholm"),
    ("gaevle", "gävle"),
];

/// Cheap cache-key normalization: lowercase and trim
pub fn simple_normalize(name: &str) -> String {
    name.to_lowercase().trim().to_string()
}

/// Pure, deterministic location name normalizer
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    index: Option<Arc<LocationIndex>>,
}

impl Normalizer {
    /// Normalizer that can prefer index keys for hyphenated names
    pub fn new(index: Arc<LocationIndex>) -> Self {
        Self { index: Some(index) }
    }

    /// Normalizer with no index to consult
    pub fn standalone() -> Self {
        Self { index: None }
    }

    /// Produces the canonical lookup key for `raw`. Never fails; empty
    /// input yields an empty string.
    ///
    /// Each strip runs once: "x stad kommun" keeps "stad", and stacked
    /// prefixes lose only their outer layer ("i i Kiruna" gives "i kiruna",
    /// "Brand Brand Malmö" gives "brand malmö"). Such inputs are therefore
    /// not idempotent.
    pub fn normalize(&self, raw: &str) -> String {
        let raw = raw.trim();

        if raw.is_empty() {
            return String::new();
        }

        let remainder = match LOCATIVE_PREFIX.captures(raw) {
            Some(caps) => caps[2].to_string(),
            None => raw.to_string(),
        };

        let lowered = remainder.to_lowercase();
        let without_suffix = ADMINISTRATIVE_SUFFIX.replace(&lowered, "");
        let without_incident = INCIDENT_PREFIX.replace(&without_suffix, "");
        let collapsed = SEPARATORS.replace_all(&without_incident, " ");

        let normalized = collapsed
            .trim()
            .split(' ')
            .map(correct_transliteration)
            .collect::<Vec<_>>()
            .join(" ");

        if normalized.contains('-') {
            let variant = normalized
                .split('-')
                .map(str::trim)
                .collect::<Vec<_>>()
                .join(" ");

            if self.contains_key(&variant) {
                return variant;
            }
        }

        normalized
    }

    /// Heuristically pulls the location phrase out of a police-report title.
    ///
    /// "Trafikolycka, personskada, Enköping" yields "Enköping"; a title
    /// without commas is fuzzy-matched against the index, then its final
    /// word is tried as an exact key.
    pub fn extract_location(&self, raw: &str) -> Option<String> {
        if raw.is_empty() {
            return None;
        }

        let parts: Vec<&str> = raw.split(',').collect();

        match parts.len() {
            0 | 1 => {}
            2 => return Some(parts[1].trim().to_string()),
            n => return Some(parts[n - 1].trim().to_string()),
        }

        let index = self.index.as_ref()?;
        let normalized = self.normalize(raw);

        if let Some(entry) = index
            .find_by_fuzzy_match(&normalized, DEFAULT_FUZZY_THRESHOLD, 1)
            .first()
        {
            return Some(entry.name.clone());
        }

        TRAILING_WORD
            .captures(raw)
            .map(|caps| caps[1].to_string())
            .filter(|word| index.find_by_exact_name(word).is_some())
    }

    fn contains_key(&self, name: &str) -> bool {
        self.index
            .as_ref()
            .is_some_and(|index| index.find_by_exact_name(name).is_some())
    }
}

fn correct_transliteration(token: &str) -> &str {
    TRANSLITERATIONS
        .iter()
        .find(|(folded, _)| *folded == token)
        .map(|(_, corrected)| *corrected)
        .unwrap_or(token)
}
