//! Normalize command - shows the lookup keys derived from raw names

use std::sync::Arc;

use clap::Args;
use serde::Serialize;

use super::{bootstrap, print_json};
use crate::domain::location_index::LocationIndex;
use crate::domain::normalizer::{simple_normalize, Normalizer};

/// Arguments for the normalize command
#[derive(Args, Clone)]
pub struct NormalizeArgs {
    /// Raw location names or event titles
    #[arg(required = true)]
    pub names: Vec<String>,
}

#[derive(Debug, Serialize)]
struct NormalizedName {
    raw: String,
    key: String,
    normalized: String,
    extracted: Option<String>,
}

fn describe(normalizer: &Normalizer, raw: &str) -> NormalizedName {
    NormalizedName {
        raw: raw.to_string(),
        key: simple_normalize(raw),
        normalized: normalizer.normalize(raw),
        extracted: normalizer.extract_location(raw),
    }
}

/// Run the normalize command
pub async fn run(args: NormalizeArgs) -> anyhow::Result<()> {
    let runtime = bootstrap()?;

    let gazetteer = runtime.config.gazetteer.load()?;
    let index = LocationIndex::build(&gazetteer, runtime.config.index.index_config());
    let normalizer = Normalizer::new(Arc::new(index));

    let described: Vec<_> = args
        .names
        .iter()
        .map(|raw| describe(&normalizer, raw))
        .collect();

    print_json(&described)
}
