//! Lookup command - direct location index queries, no cache or network

use clap::{Args, ValueEnum};
use serde::Serialize;

use super::{bootstrap, print_json};
use crate::config::AppConfig;
use crate::domain::geo::GazetteerEntry;
use crate::domain::location_index::LocationIndex;

/// Index strategy to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Strategy {
    Exact,
    Prefix,
    Fuzzy,
    County,
    /// Exact, then prefix, then fuzzy
    #[default]
    Auto,
}

/// Arguments for the lookup command
#[derive(Args, Clone)]
pub struct LookupArgs {
    /// Name, prefix or county to look up
    pub name: String,

    #[arg(long, value_enum, default_value_t = Strategy::Auto)]
    pub strategy: Strategy,

    /// Maximum entries returned by prefix, fuzzy and county lookups
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

#[derive(Debug, Serialize)]
struct LookupReport<'a> {
    query: &'a str,
    strategy: &'static str,
    matches: Vec<&'a GazetteerEntry>,
}

fn strategy_name(strategy: Strategy) -> &'static str {
    match strategy {
        Strategy::Exact => "exact",
        Strategy::Prefix => "prefix",
        Strategy::Fuzzy => "fuzzy",
        Strategy::County => "county",
        Strategy::Auto => "auto",
    }
}

fn lookup<'a>(
    index: &'a LocationIndex,
    config: &AppConfig,
    args: &'a LookupArgs,
) -> LookupReport<'a> {
    let name = args.name.trim();
    let search = config.index.search_options();

    let matches = match args.strategy {
        Strategy::Exact => index.find_by_exact_name(name).into_iter().collect(),
        Strategy::Prefix => index.find_by_prefix(name, args.limit),
        Strategy::Fuzzy => index.find_by_fuzzy_match(name, search.fuzzy_threshold, args.limit),
        Strategy::County => index.find_by_county(name).into_iter().take(args.limit).collect(),
        Strategy::Auto => index.find_location(name, search).into_iter().collect(),
    };

    LookupReport {
        query: name,
        strategy: strategy_name(args.strategy),
        matches,
    }
}

/// Run the lookup command
pub async fn run(args: LookupArgs) -> anyhow::Result<()> {
    let runtime = bootstrap()?;
    runtime.config.validate()?;

    let gazetteer = runtime.config.gazetteer.load()?;
    let index = LocationIndex::build(&gazetteer, runtime.config.index.index_config());

    print_json(&lookup(&index, &runtime.config, &args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geo::Gazetteer;
    use crate::domain::location_index::IndexConfig;

    fn index() -> LocationIndex {
        LocationIndex::build(&Gazetteer::builtin().unwrap(), IndexConfig::default())
    }

    fn args(name: &str, strategy: Strategy) -> LookupArgs {
        LookupArgs {
            name: name.to_string(),
            strategy,
            limit: 10,
        }
    }

    #[test]
    fn test_auto_lookup_finds_typo() {
        let index = index();
        let args = args("stokholm", Strategy::Auto);

        let report = lookup(&index, &AppConfig::default(), &args);

        assert_eq!(report.strategy, "auto");
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.matches[0].name, "stockholm");
    }

    #[test]
    fn test_exact_lookup_misses_typo() {
        let index = index();
        let args = args("stokholm", Strategy::Exact);

        assert!(lookup(&index, &AppConfig::default(), &args).matches.is_empty());
    }

    #[test]
    fn test_prefix_lookup_respects_limit() {
        let index = index();
        let args = LookupArgs {
            limit: 2,
            ..args("sto", Strategy::Prefix)
        };

        let report = lookup(&index, &AppConfig::default(), &args);

        assert!(!report.matches.is_empty());
        assert!(report.matches.len() <= 2);
    }
}
