//! Multi-strategy location index over the gazetteer

use std::collections::{BTreeMap, HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::levenshtein;
use crate::domain::geo::{Gazetteer, GazetteerEntry};

/// Default maximum prefix length indexed per name
pub const DEFAULT_PREFIX_LENGTH: usize = 3;

/// Default maximum edit distance for fuzzy matches
pub const DEFAULT_FUZZY_THRESHOLD: usize = 2;

/// Number of nearest prefix buckets merged when the exact bucket is empty
const CLOSEST_PREFIX_BUCKETS: usize = 3;

static COUNTY_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*?)\s+län$").unwrap());

static MUNICIPALITY_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*?)\s+kommun$").unwrap());

static TRAILING_COUNTY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+län$").unwrap());

/// Which gazetteer entries are scored during fuzzy matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuzzyCandidates {
    /// Only entries sharing the query's first character. Fast, but misses
    /// typos in the first letter.
    #[default]
    FirstLetter,
    /// Every entry in the gazetteer
    FullScan,
}

/// Index construction parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    pub prefix_length: usize,
    pub fuzzy_candidates: FuzzyCandidates,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            prefix_length: DEFAULT_PREFIX_LENGTH,
            fuzzy_candidates: FuzzyCandidates::default(),
        }
    }
}

impl IndexConfig {
    pub fn with_prefix_length(mut self, prefix_length: usize) -> Self {
        self.prefix_length = prefix_length;
        self
    }

    pub fn with_fuzzy_candidates(mut self, candidates: FuzzyCandidates) -> Self {
        self.fuzzy_candidates = candidates;
        self
    }
}

/// Options for the progressive [`LocationIndex::find_location`] search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub fuzzy_threshold: usize,
    pub try_fuzzy: bool,
    pub try_prefix: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            try_fuzzy: true,
            try_prefix: true,
        }
    }
}

impl SearchOptions {
    pub fn with_fuzzy_threshold(mut self, threshold: usize) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }

    pub fn without_fuzzy(mut self) -> Self {
        self.try_fuzzy = false;
        self
    }

    pub fn without_prefix(mut self) -> Self {
        self.try_prefix = false;
        self
    }
}

/// Read-only lookup structures derived from a [`Gazetteer`].
///
/// All maps store positions into `entries`; queries hand out borrowed
/// entries so lookups never clone.
#[derive(Debug, Clone)]
pub struct LocationIndex {
    entries: Vec<GazetteerEntry>,
    by_exact_name: HashMap<String, usize>,
    by_prefix: BTreeMap<String, Vec<usize>>,
    by_county: HashMap<String, Vec<usize>>,
    config: IndexConfig,
}

impl LocationIndex {
    /// Builds all indexes from the gazetteer
    pub fn build(gazetteer: &Gazetteer, config: IndexConfig) -> Self {
        let mut index = Self {
            entries: Vec::new(),
            by_exact_name: HashMap::new(),
            by_prefix: BTreeMap::new(),
            by_county: HashMap::new(),
            config,
        };

        index.rebuild(gazetteer);
        index
    }

    /// Discards the current indexes and rebuilds them from `gazetteer`
    pub fn rebuild(&mut self, gazetteer: &Gazetteer) {
        tracing::debug!(
            prefix_length = self.config.prefix_length,
            "Building location index"
        );

        self.entries = gazetteer.entries().to_vec();
        self.by_exact_name.clear();
        self.by_prefix.clear();
        self.by_county.clear();

        for (position, entry) in self.entries.iter().enumerate() {
            let name = entry.name.to_lowercase();

            // Later entries overwrite earlier ones with the same name
            self.by_exact_name.insert(name.clone(), position);

            let chars: Vec<char> = name.chars().collect();
            for len in 1..=chars.len().min(self.config.prefix_length) {
                let prefix: String = chars[..len].iter().collect();
                self.by_prefix.entry(prefix).or_default().push(position);
            }

            if let Some(caps) = COUNTY_SUFFIX.captures(&name) {
                self.by_county
                    .entry(caps[1].to_string())
                    .or_default()
                    .push(position);
            }

            if let Some(caps) = MUNICIPALITY_SUFFIX.captures(&name) {
                self.by_exact_name.insert(caps[1].to_string(), position);
            }
        }

        tracing::info!(
            named_entries = self.by_exact_name.len(),
            prefixes = self.by_prefix.len(),
            counties = self.by_county.len(),
            "Location index built"
        );
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Number of distinct exact-match keys, including municipality aliases
    pub fn len(&self) -> usize {
        self.by_exact_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_exact_name.is_empty()
    }

    pub fn prefix_count(&self) -> usize {
        self.by_prefix.len()
    }

    pub fn county_count(&self) -> usize {
        self.by_county.len()
    }

    /// Case-insensitive exact lookup
    pub fn find_by_exact_name(&self, name: &str) -> Option<&GazetteerEntry> {
        if name.is_empty() {
            return None;
        }

        self.by_exact_name
            .get(&name.to_lowercase())
            .map(|&position| &self.entries[position])
    }

    /// Entries whose names start with the same (truncated) prefix as `prefix`.
    ///
    /// When that bucket is empty, merges the buckets of the closest prefix
    /// keys sharing the first character, deduplicated by name.
    pub fn find_by_prefix(&self, prefix: &str, limit: usize) -> Vec<&GazetteerEntry> {
        if prefix.is_empty() || limit == 0 {
            return Vec::new();
        }

        let key: String = prefix
            .to_lowercase()
            .chars()
            .take(self.config.prefix_length)
            .collect();

        if let Some(bucket) = self.by_prefix.get(&key).filter(|b| !b.is_empty()) {
            return bucket
                .iter()
                .take(limit)
                .map(|&position| &self.entries[position])
                .collect();
        }

        let Some(first) = key.chars().next() else {
            return Vec::new();
        };

        let mut closest: Vec<(&String, usize)> = self
            .by_prefix
            .range(first.to_string()..)
            .take_while(|(candidate, _)| candidate.starts_with(first))
            .map(|(candidate, _)| (candidate, levenshtein(candidate, &key)))
            .collect();
        closest.sort_by_key(|(_, distance)| *distance);

        let mut seen = HashSet::new();
        closest
            .into_iter()
            .take(CLOSEST_PREFIX_BUCKETS)
            .flat_map(|(candidate, _)| self.by_prefix[candidate].iter())
            .map(|&position| &self.entries[position])
            .filter(|entry| seen.insert(entry.name.as_str()))
            .take(limit)
            .collect()
    }

    /// Entries indexed under a county, with or without the `län` suffix
    pub fn find_by_county(&self, county: &str) -> Vec<&GazetteerEntry> {
        if county.is_empty() {
            return Vec::new();
        }

        let lower = county.to_lowercase();
        let key = TRAILING_COUNTY.replace(&lower, "");

        self.by_county
            .get(key.as_ref())
            .map(|positions| {
                positions
                    .iter()
                    .map(|&position| &self.entries[position])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Entries within `threshold` edits of `name`, closest first.
    ///
    /// Queries of three characters or fewer use a threshold of 1, and
    /// queries shorter than three characters fall back to prefix search.
    pub fn find_by_fuzzy_match(
        &self,
        name: &str,
        threshold: usize,
        limit: usize,
    ) -> Vec<&GazetteerEntry> {
        if name.is_empty() || limit == 0 {
            return Vec::new();
        }

        let lower = name.to_lowercase();
        let length = lower.chars().count();
        let threshold = if length <= 3 { 1 } else { threshold };

        if length < 3 {
            return self.find_by_prefix(&lower, limit);
        }

        let Some(first) = lower.chars().next() else {
            return Vec::new();
        };

        let mut matches: Vec<(&GazetteerEntry, usize)> = self
            .entries
            .iter()
            .filter(|entry| match self.config.fuzzy_candidates {
                FuzzyCandidates::FirstLetter => entry.name.starts_with(first),
                FuzzyCandidates::FullScan => true,
            })
            .map(|entry| (entry, levenshtein(&entry.name, &lower)))
            .filter(|(_, distance)| *distance <= threshold)
            .collect();
        matches.sort_by_key(|(_, distance)| *distance);

        matches
            .into_iter()
            .take(limit)
            .map(|(entry, _)| entry)
            .collect()
    }

    /// Progressive search: exact, then prefix, then fuzzy.
    ///
    /// The prefix stage only accepts an entry whose name starts with the
    /// whole query, so it never competes with fuzzy matching on noise.
    pub fn find_location(&self, name: &str, options: SearchOptions) -> Option<&GazetteerEntry> {
        if name.is_empty() {
            return None;
        }

        if let Some(entry) = self.find_by_exact_name(name) {
            return Some(entry);
        }

        if options.try_prefix {
            let lower = name.to_lowercase();
            let candidate = self
                .find_by_prefix(&lower, usize::MAX)
                .into_iter()
                .find(|entry| entry.name.starts_with(&lower));

            if candidate.is_some() {
                return candidate;
            }
        }

        if options.try_fuzzy {
            return self
                .find_by_fuzzy_match(name, options.fuzzy_threshold, 1)
                .into_iter()
                .next();
        }

        None
    }
}
