//! Cache statistics and health reports

use serde::Serialize;

/// Counters and gauges describing cache behaviour since startup
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub total_requests: u64,
    pub hits: u64,
    pub misses: u64,
    /// Percentage of requests served from the cache
    pub hit_rate: f64,
    /// Percentage of requests that needed a load
    pub miss_rate: f64,
    pub loads: u64,
    pub load_failures: u64,
    pub verification_failures: u64,
    /// Requests for a symbol with no resolvable model
    pub unavailable: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub avg_load_time_ms: f64,
    pub entries: usize,
    pub max_entries: usize,
    pub estimated_memory_mb: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_memory_mb: Option<u64>,
    pub ttl_secs: u64,
}

/// Result of re-verifying every cached entry
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HealthCheckReport {
    pub checked: usize,
    pub healthy: usize,
    pub unhealthy: usize,
    /// Entries dropped because their registry record disappeared
    pub unregistered: usize,
    /// Keys removed during the check
    pub removed: Vec<String>,
}

impl HealthCheckReport {
    pub fn is_all_healthy(&self) -> bool {
        self.unhealthy == 0 && self.unregistered == 0
    }
}
