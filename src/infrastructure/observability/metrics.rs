//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::MetricsConfig;
use crate::domain::RemovalCause;

/// Prometheus metrics handle
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Get the metrics in Prometheus text exposition format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the Prometheus recorder
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            register_default_metrics();
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

fn register_default_metrics() {
    gauge!("model_cache_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Outcome of a cache lookup, used as a metric label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Hit,
    Miss,
    Unavailable,
}

impl LookupOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Unavailable => "unavailable",
        }
    }
}

/// Record a cache lookup
pub fn record_cache_lookup(symbol: &str, outcome: LookupOutcome) {
    let labels = [
        ("symbol", symbol.to_string()),
        ("outcome", outcome.as_str().to_string()),
    ];

    counter!("model_cache_requests_total", &labels).increment(1);
}

/// Record an artifact load attempt
pub fn record_model_load(symbol: &str, duration: Duration, success: bool) {
    let labels = [
        ("symbol", symbol.to_string()),
        ("status", if success { "success" } else { "error" }.to_string()),
    ];

    counter!("model_cache_loads_total", &labels).increment(1);
    histogram!("model_cache_load_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Record a handle failing the smoke test
pub fn record_verification_failure(symbol: &str) {
    counter!("model_cache_verification_failures_total", "symbol" => symbol.to_string())
        .increment(1);
}

/// Record entries leaving the cache
pub fn record_cache_removal(cause: RemovalCause, count: usize) {
    if count == 0 {
        return;
    }

    counter!("model_cache_removals_total", "cause" => cause.as_str()).increment(count as u64);
}

/// Record current cache occupancy
pub fn record_cache_occupancy(entries: usize, memory_bytes: u64) {
    gauge!("model_cache_entries").set(entries as f64);
    gauge!("model_cache_memory_bytes").set(memory_bytes as f64);
}

/// Record artifacts added by discovery
pub fn record_registry_discovered(count: usize) {
    counter!("model_registry_discovered_total").increment(count as u64);
}

/// Record records dropped by validation
pub fn record_registry_pruned(count: usize) {
    counter!("model_registry_pruned_total").increment(count as u64);
}

/// Record a failed registry write
pub fn record_registry_persist_failure() {
    counter!("model_registry_persist_failures_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_outcome_labels() {
        assert_eq!(LookupOutcome::Hit.as_str(), "hit");
        assert_eq!(LookupOutcome::Miss.as_str(), "miss");
        assert_eq!(LookupOutcome::Unavailable.as_str(), "unavailable");
    }

    #[test]
    fn test_disabled_metrics() {
        let config = MetricsConfig { enabled: false };
        assert!(init_metrics(&config).is_none());
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_cache_lookup("BTC", LookupOutcome::Hit);
        record_model_load("BTC", Duration::from_millis(5), true);
        record_cache_removal(RemovalCause::Evicted, 0);
        record_cache_occupancy(1, 1024);
    }
}
