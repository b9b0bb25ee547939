//! Location index - exact, prefix, county and fuzzy lookups over the gazetteer

mod index;
mod levenshtein;

pub use index::{
    FuzzyCandidates, IndexConfig, LocationIndex, SearchOptions, DEFAULT_FUZZY_THRESHOLD,
    DEFAULT_PREFIX_LENGTH,
};
pub use levenshtein::levenshtein;
