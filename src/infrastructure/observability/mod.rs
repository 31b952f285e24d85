//! Observability infrastructure - Metrics and cache telemetry

mod metrics;
mod telemetry;

pub use metrics::{
    init_metrics, record_cache_lookup, record_cache_occupancy, record_cache_removal,
    record_model_load, record_registry_discovered, record_registry_persist_failure,
    record_registry_pruned, record_verification_failure, LookupOutcome, PrometheusMetrics,
};
pub use telemetry::CacheTelemetry;
