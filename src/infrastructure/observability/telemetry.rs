//! In-process cache counters

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::metrics::{
    record_cache_lookup, record_cache_removal, record_model_load, record_verification_failure,
    LookupOutcome,
};
use crate::domain::{CacheStats, RemovalCause};

/// Hit/miss and load counters backing `ModelCache::stats`
///
/// Every update is mirrored to the `metrics` facade.
#[derive(Debug, Default)]
pub struct CacheTelemetry {
    requests: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    unavailable: AtomicU64,
    loads: AtomicU64,
    load_failures: AtomicU64,
    load_time_micros: AtomicU64,
    verification_failures: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

impl CacheTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self, symbol: &str) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.hits.fetch_add(1, Ordering::Relaxed);
        record_cache_lookup(symbol, LookupOutcome::Hit);
    }

    pub fn record_miss(&self, symbol: &str) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.misses.fetch_add(1, Ordering::Relaxed);
        record_cache_lookup(symbol, LookupOutcome::Miss);
    }

    /// A request that could not be resolved to any model counts as a miss
    pub fn record_unavailable(&self, symbol: &str) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.misses.fetch_add(1, Ordering::Relaxed);
        self.unavailable.fetch_add(1, Ordering::Relaxed);
        record_cache_lookup(symbol, LookupOutcome::Unavailable);
    }

    pub fn record_load(&self, symbol: &str, duration: Duration) {
        self.loads.fetch_add(1, Ordering::Relaxed);
        self.load_time_micros
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        record_model_load(symbol, duration, true);
    }

    pub fn record_load_failure(&self, symbol: &str, duration: Duration) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
        record_model_load(symbol, duration, false);
    }

    pub fn record_verification_failure(&self, symbol: &str) {
        self.verification_failures.fetch_add(1, Ordering::Relaxed);
        record_verification_failure(symbol);
    }

    pub fn record_removal(&self, cause: RemovalCause, count: usize) {
        let count_u64 = count as u64;

        match cause {
            RemovalCause::Evicted => {
                self.evictions.fetch_add(count_u64, Ordering::Relaxed);
            }
            RemovalCause::Expired => {
                self.expirations.fetch_add(count_u64, Ordering::Relaxed);
            }
            RemovalCause::Unhealthy => {
                self.verification_failures
                    .fetch_add(count_u64, Ordering::Relaxed);
            }
            _ => {}
        }

        record_cache_removal(cause, count);
    }

    /// Counter half of the stats report; occupancy and budget fields are left default
    pub fn snapshot(&self) -> CacheStats {
        let requests = self.requests.load(Ordering::Relaxed);
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let loads = self.loads.load(Ordering::Relaxed);
        let load_time_micros = self.load_time_micros.load(Ordering::Relaxed);

        CacheStats {
            total_requests: requests,
            hits,
            misses,
            hit_rate: percentage(hits, requests),
            miss_rate: percentage(misses, requests),
            loads,
            load_failures: self.load_failures.load(Ordering::Relaxed),
            verification_failures: self.verification_failures.load(Ordering::Relaxed),
            unavailable: self.unavailable.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            avg_load_time_ms: if loads == 0 {
                0.0
            } else {
                load_time_micros as f64 / loads as f64 / 1000.0
            },
            ..Default::default()
        }
    }
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
