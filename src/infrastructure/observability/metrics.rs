//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::MetricsConfig;

/// Where a resolution was answered from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Cache,
    NegativeCache,
    LocalIndex,
    Segment,
    External,
    Miss,
}

impl ResolutionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::NegativeCache => "negative_cache",
            Self::LocalIndex => "local_index",
            Self::Segment => "segment",
            Self::External => "external",
            Self::Miss => "miss",
        }
    }
}

/// Prometheus handle for rendering the text exposition format
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Installs the Prometheus recorder when metrics are enabled
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::debug!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("polis_geocoder_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!("Prometheus metrics initialized");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

pub fn record_resolution(source: ResolutionSource) {
    counter!("geocoding_resolutions_total", "source" => source.as_str()).increment(1);
}

/// Record one call to the external geocoder
pub fn record_external_request(provider: &str, status: &'static str, duration: Duration) {
    let labels = [("provider", provider.to_string()), ("status", status.to_string())];

    counter!("geocoding_external_requests_total", &labels).increment(1);
    histogram!("geocoding_external_request_duration_seconds", &labels)
        .record(duration.as_secs_f64());
}

pub fn record_batch_item(success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!("geocoding_batch_items_total", "status" => status).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_source_labels() {
        assert_eq!(ResolutionSource::NegativeCache.as_str(), "negative_cache");
        assert_eq!(ResolutionSource::LocalIndex.as_str(), "local_index");
    }

    #[test]
    fn test_disabled_metrics_install_nothing() {
        let config = MetricsConfig { enabled: false };
        assert!(init_metrics(&config).is_none());
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_resolution(ResolutionSource::Cache);
        record_external_request("nominatim", "hit", Duration::from_millis(12));
        record_batch_item(true);
    }
}
