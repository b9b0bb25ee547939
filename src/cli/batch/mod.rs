//! Batch command - paced, deduplicated resolution of many names

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tracing::info;

use super::{bootstrap, print_json, read_lines};
use crate::domain::geocoding::{BatchOptions, BatchResult, BatchSummary};
use crate::GeocodingContext;

/// Batch tuning flags shared by commands that resolve in bulk
#[derive(Args, Clone, Debug, Default)]
pub struct BatchFlags {
    /// Names resolved concurrently per chunk (overrides config)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Pause between chunks in milliseconds (overrides config)
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Extra attempts after an error or timeout (overrides config)
    #[arg(long)]
    pub retries: Option<u32>,

    /// Pause before each retry in milliseconds (overrides config)
    #[arg(long)]
    pub retry_delay_ms: Option<u64>,

    /// Per-attempt timeout in milliseconds (overrides config)
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

/// Arguments for the batch command
#[derive(Args, Clone, Default)]
pub struct BatchArgs {
    /// File with one location name per line
    #[arg(long)]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub flags: BatchFlags,

    /// Location names, appended after the file contents
    pub names: Vec<String>,
}

impl BatchFlags {
    /// Layers the flags given on the command line over `base`
    pub fn apply(&self, base: &BatchOptions) -> anyhow::Result<BatchOptions> {
        let mut options = base.clone();

        if let Some(concurrency) = self.concurrency {
            options = options.with_concurrency(concurrency);
        }
        if let Some(delay_ms) = self.delay_ms {
            options = options.with_delay_ms(delay_ms);
        }
        if let Some(retries) = self.retries {
            options = options.with_retries(retries);
        }
        if let Some(retry_delay_ms) = self.retry_delay_ms {
            options = options.with_retry_delay_ms(retry_delay_ms);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            options = options.with_timeout_ms(timeout_ms);
        }

        anyhow::ensure!(options.concurrency > 0, "--concurrency must be at least 1");
        anyhow::ensure!(options.timeout_ms > 0, "--timeout-ms must be positive");

        Ok(options)
    }
}

impl BatchArgs {
    fn collect_names(&self) -> anyhow::Result<Vec<String>> {
        let mut names = match &self.file {
            Some(path) => read_lines(path)?,
            None => Vec::new(),
        };
        names.extend(self.names.iter().cloned());

        Ok(names)
    }
}

#[derive(Debug, Serialize)]
struct BatchReport {
    summary: BatchSummary,
    results: Vec<BatchResult>,
}

/// Run the batch command
pub async fn run(args: BatchArgs) -> anyhow::Result<()> {
    let runtime = bootstrap()?;
    let context = GeocodingContext::from_config(&runtime.config)?;

    let names = args.collect_names()?;
    if names.is_empty() {
        anyhow::bail!("No location names given; pass names or --file");
    }

    let options = args.flags.apply(context.batch_options())?;

    let results = context.batch().batch_resolve(&names, &options).await;
    let summary = BatchSummary::from_results(&results);

    print_json(&BatchReport { summary, results })?;

    if let Some(metrics) = runtime.metrics {
        info!("Rendering Prometheus metrics to stderr");
        eprintln!("{}", metrics.render());
    }

    Ok(())
}
