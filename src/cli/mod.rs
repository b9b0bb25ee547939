//! CLI module for the Polis geocoder
//!
//! Provides subcommands driving the resolution engine:
//! - `resolve`: resolve names to coordinates
//! - `batch`: paced batch resolution with retries
//! - `lookup`: query the location index directly
//! - `normalize`: show normalized and extracted names
//! - `reprocess`: re-geocode event records from a JSON file
//!
//! Results are written to stdout as JSON; logs go to stderr.

pub mod batch;
pub mod lookup;
pub mod normalize;
pub mod reprocess;
pub mod resolve;

use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::infrastructure::observability::{init_metrics, PrometheusMetrics};

/// Polis geocoder - Swedish location-name resolution for police event feeds
#[derive(Parser)]
#[command(name = "polis-geocoder")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve location names to coordinates
    Resolve(resolve::ResolveArgs),

    /// Resolve many names with bounded concurrency, pacing and retries
    Batch(batch::BatchArgs),

    /// Query the location index without caching or network access
    Lookup(lookup::LookupArgs),

    /// Normalize raw names the way the resolver does
    Normalize(normalize::NormalizeArgs),

    /// Re-geocode event records and emit geodata updates
    Reprocess(reprocess::ReprocessArgs),
}

/// Loaded configuration plus the metrics handle, if enabled
pub(crate) struct Runtime {
    pub config: AppConfig,
    pub metrics: Option<PrometheusMetrics>,
}

/// Environment, configuration, logging and metrics setup shared by all commands
pub(crate) fn bootstrap() -> anyhow::Result<Runtime> {
    dotenvy::dotenv().ok();

    let config = load_config()?;
    logging::init_logging(&config.logging);
    let metrics = init_metrics(&config.metrics);

    Ok(Runtime { config, metrics })
}

fn load_config() -> anyhow::Result<AppConfig> {
    AppConfig::load().context("Failed to load configuration")
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Non-empty trimmed lines of a text file
pub(crate) fn read_lines(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
