//! Cache entry and lifecycle types

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ModelCacheKey;
use crate::domain::model::ModelHandle;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Why an entry left the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalCause {
    /// Older than the TTL
    Expired,
    /// Failed a health re-check
    Unhealthy,
    /// Dropped by the capacity pass
    Evicted,
    /// Explicitly invalidated or cleared
    Invalidated,
    /// Its registry record no longer exists
    Unregistered,
    /// Replaced by a forced reload
    Replaced,
}

impl RemovalCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::Unhealthy => "unhealthy",
            Self::Evicted => "evicted",
            Self::Invalidated => "invalidated",
            Self::Unregistered => "unregistered",
            Self::Replaced => "replaced",
        }
    }
}

/// A loaded, verified model held by the cache
#[derive(Debug)]
pub struct CacheEntry {
    key: ModelCacheKey,
    handle: Arc<dyn ModelHandle>,
    loaded_at: Instant,
    loaded_at_utc: DateTime<Utc>,
    last_access_at: Instant,
    access_count: u64,
    estimated_memory_bytes: u64,
    healthy: bool,
}

impl CacheEntry {
    pub fn new(
        key: ModelCacheKey,
        handle: Arc<dyn ModelHandle>,
        estimated_memory_bytes: u64,
        now: Instant,
    ) -> Self {
        Self {
            key,
            handle,
            loaded_at: now,
            loaded_at_utc: Utc::now(),
            last_access_at: now,
            access_count: 0,
            estimated_memory_bytes,
            healthy: true,
        }
    }

    pub fn key(&self) -> &ModelCacheKey {
        &self.key
    }

    pub fn handle(&self) -> &Arc<dyn ModelHandle> {
        &self.handle
    }

    pub fn loaded_at(&self) -> Instant {
        self.loaded_at
    }

    pub fn last_access_at(&self) -> Instant {
        self.last_access_at
    }

    pub fn access_count(&self) -> u64 {
        self.access_count
    }

    pub fn estimated_memory_bytes(&self) -> u64 {
        self.estimated_memory_bytes
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy
    }

    pub fn set_healthy(&mut self, healthy: bool) {
        self.healthy = healthy;
    }

    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.loaded_at)
    }

    /// TTL is a hard ceiling on age, counted from load time
    pub fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        self.age(now) >= ttl
    }

    /// Records an access
    pub fn touch(&mut self, now: Instant) {
        self.last_access_at = now;
        self.access_count += 1;
    }

    pub fn info(&self, ttl: Duration, now: Instant) -> CacheEntryInfo {
        CacheEntryInfo {
            symbol: self.key.symbol().to_string(),
            model_id: self.key.model_id().to_string(),
            loaded_at: self.loaded_at_utc,
            age_secs: self.age(now).as_secs_f64(),
            idle_secs: now.saturating_duration_since(self.last_access_at).as_secs_f64(),
            ttl_remaining_secs: ttl.saturating_sub(self.age(now)).as_secs_f64(),
            access_count: self.access_count,
            estimated_memory_mb: self.estimated_memory_bytes as f64 / BYTES_PER_MB,
            healthy: self.healthy,
        }
    }
}

/// Point-in-time view of one entry, for operational reporting
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntryInfo {
    pub symbol: String,
    pub model_id: String,
    pub loaded_at: DateTime<Utc>,
    pub age_secs: f64,
    pub idle_secs: f64,
    pub ttl_remaining_secs: f64,
    pub access_count: u64,
    pub estimated_memory_mb: f64,
    pub healthy: bool,
}
