//! Reprocess command - re-geocodes event records read from a JSON file

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use async_trait::async_trait;
use clap::Args;
use serde::Serialize;

use super::{batch::BatchFlags, bootstrap, print_json};
use crate::domain::geocoding::{EventLocation, GeodataSink, GeodataUpdate, ReprocessSummary};
use crate::domain::DomainError;
use crate::GeocodingContext;

/// Arguments for the reprocess command
#[derive(Args, Clone)]
pub struct ReprocessArgs {
    /// JSON array of `{"id": ..., "location_name": ...}` records
    #[arg(long)]
    pub file: PathBuf,

    #[command(flatten)]
    pub flags: BatchFlags,
}

/// Update written back for one event
#[derive(Debug, Clone, PartialEq, Serialize)]
struct EventUpdate {
    id: String,
    #[serde(flatten)]
    geodata: GeodataUpdate,
}

/// Sink that collects updates for printing instead of writing to a store
#[derive(Debug, Default)]
struct CollectingSink {
    updates: Mutex<Vec<EventUpdate>>,
}

impl CollectingSink {
    fn into_updates(self) -> Vec<EventUpdate> {
        self.updates
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl GeodataSink for CollectingSink {
    async fn update_geodata(&self, event_id: &str, update: GeodataUpdate) -> Result<(), DomainError> {
        self.updates
            .lock()
            .map_err(|e| DomainError::internal(format!("Update sink poisoned: {}", e)))?
            .push(EventUpdate {
                id: event_id.to_string(),
                geodata: update,
            });
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ReprocessReport {
    summary: ReprocessSummary,
    updates: Vec<EventUpdate>,
}

fn read_events(path: &Path) -> anyhow::Result<Vec<EventLocation>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse events in {}", path.display()))
}

/// Run the reprocess command
pub async fn run(args: ReprocessArgs) -> anyhow::Result<()> {
    let runtime = bootstrap()?;
    let context = GeocodingContext::from_config(&runtime.config)?;

    let events = read_events(&args.file)?;
    let options = args.flags.apply(context.batch_options())?;

    let sink = CollectingSink::default();
    let summary = context.batch().reprocess_events(&events, &sink, &options).await;

    print_json(&ReprocessReport {
        summary,
        updates: sink.into_updates(),
    })
}
