//! Observability infrastructure - Prometheus metrics

mod metrics;

pub use metrics::{
    init_metrics, record_batch_item, record_external_request, record_resolution,
    PrometheusMetrics, ResolutionSource,
};
