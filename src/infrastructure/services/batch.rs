//! Batch resolution with bounded concurrency, pacing, retries and timeouts

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::domain::geo::Coordinates;
use crate::domain::geocoding::{
    BatchOptions, BatchResult, BatchSummary, EventLocation, GeodataSink, GeodataUpdate,
    LocationResolver, ReprocessSummary,
};
use crate::infrastructure::observability::record_batch_item;

/// Runs a [`LocationResolver`] over many names.
///
/// Names are deduplicated, then processed in chunks of
/// `options.concurrency`; a chunk fully settles before the pause that
/// precedes the next one. Individual failures never abort the batch.
#[derive(Clone)]
pub struct BatchResolver {
    resolver: Arc<dyn LocationResolver>,
}

impl std::fmt::Debug for BatchResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchResolver").finish_non_exhaustive()
    }
}

impl BatchResolver {
    pub fn new(resolver: Arc<dyn LocationResolver>) -> Self {
        Self { resolver }
    }

    /// One result per unique name, in first-seen order
    pub async fn batch_resolve(&self, names: &[String], options: &BatchOptions) -> Vec<BatchResult> {
        let mut seen = HashSet::new();
        let unique: Vec<&str> = names
            .iter()
            .map(String::as_str)
            .filter(|name| seen.insert(*name))
            .collect();

        if unique.is_empty() {
            return Vec::new();
        }

        info!(
            unique = unique.len(),
            total = names.len(),
            concurrency = options.chunk_size(),
            "Starting batch geocoding"
        );

        let mut results = Vec::with_capacity(unique.len());
        let chunks: Vec<&[&str]> = unique.chunks(options.chunk_size()).collect();

        for (position, chunk) in chunks.iter().enumerate() {
            let settled =
                join_all(chunk.iter().map(|name| self.resolve_with_retry(name, options))).await;

            for (name, result) in chunk.iter().zip(settled) {
                let result = BatchResult::new(*name, result);
                record_batch_item(result.success);
                results.push(result);
            }

            if position + 1 < chunks.len() {
                tokio::time::sleep(options.delay()).await;
            }
        }

        let summary = BatchSummary::from_results(&results);
        info!(
            successful = summary.successful,
            total = summary.total,
            success_rate = %format!("{:.0}%", summary.success_rate * 100.0),
            "Batch geocoding completed"
        );

        results
    }

    /// Retries only timed-out or failed attempts; a completed miss is final.
    /// A timed-out attempt is dropped, cancelling its in-flight request.
    async fn resolve_with_retry(&self, name: &str, options: &BatchOptions) -> Option<Coordinates> {
        for attempt in 0..=options.retries {
            match tokio::time::timeout(options.timeout(), self.resolver.try_resolve(name)).await {
                Ok(Ok(result)) => return result,
                Ok(Err(e)) => warn!(name, attempt, error = %e, "Geocoding attempt failed"),
                Err(_) => warn!(
                    name,
                    attempt,
                    timeout_ms = options.timeout_ms,
                    "Geocoding attempt timed out"
                ),
            }

            if attempt < options.retries {
                tokio::time::sleep(options.retry_delay()).await;
            }
        }

        debug!(name, "Giving up after retries");
        None
    }

    /// Re-geocodes stored events and writes successful results to `sink`.
    ///
    /// Events without a name, without a successful resolution, or whose
    /// update is rejected by the sink count as failed.
    pub async fn reprocess_events(
        &self,
        events: &[EventLocation],
        sink: &dyn GeodataSink,
        options: &BatchOptions,
    ) -> ReprocessSummary {
        let mut summary = ReprocessSummary {
            total: events.len(),
            ..Default::default()
        };

        if events.is_empty() {
            return summary;
        }

        let names: Vec<String> = events
            .iter()
            .filter_map(EventLocation::name)
            .map(str::to_string)
            .collect();

        let results = self.batch_resolve(&names, options).await;
        let resolved: HashMap<&str, Coordinates> = results
            .iter()
            .filter(|r| r.success)
            .filter_map(|r| r.result.map(|c| (r.location.as_str(), c)))
            .collect();

        for event in events {
            let Some(coordinates) = event.name().and_then(|name| resolved.get(name)) else {
                summary.failed += 1;
                continue;
            };

            match sink
                .update_geodata(&event.id, GeodataUpdate::from(*coordinates))
                .await
            {
                Ok(()) => summary.updated += 1,
                Err(e) => {
                    error!(event_id = %event.id, error = %e, "Failed to update event geodata");
                    summary.failed += 1;
                }
            }
        }

        info!(
            total = summary.total,
            updated = summary.updated,
            failed = summary.failed,
            "Geodata reprocessing finished"
        );

        summary
    }
}
