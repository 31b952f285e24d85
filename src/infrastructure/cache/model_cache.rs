//! Loaded model cache
//!
//! Entry lifecycle: `Absent -> Loading -> Verifying -> Active`, leaving `Active`
//! through expiry, a failed health re-check, capacity eviction or invalidation.
//! A failed load or verification never creates an entry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::config::ModelCacheConfig;
use crate::domain::model::{normalize_symbol, InputShape, ModelHandle, ModelId, ModelRecord, Tensor};
use crate::domain::{
    CacheEntry, CacheEntryInfo, CacheStats, DomainError, HealthCheckReport, HealthVerifier,
    ModelCacheKey, ModelLoader, RemovalCause,
};
use crate::infrastructure::observability::{record_cache_occupancy, CacheTelemetry};
use crate::infrastructure::registry::ModelRegistry;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

type Entries = HashMap<ModelCacheKey, CacheEntry>;

/// A verified model handed out by [`ModelCache::get`]
///
/// Meant to be held for the duration of a request; the cache stays the owner of
/// record and may drop its own reference at any time.
#[derive(Debug, Clone)]
pub struct CachedModel {
    symbol: String,
    model_id: ModelId,
    handle: Arc<dyn ModelHandle>,
}

impl CachedModel {
    fn from_entry(entry: &CacheEntry) -> Self {
        Self {
            symbol: entry.key().symbol().to_string(),
            model_id: entry.key().model_id().clone(),
            handle: entry.handle().clone(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn model_id(&self) -> &ModelId {
        &self.model_id
    }

    pub fn handle(&self) -> &Arc<dyn ModelHandle> {
        &self.handle
    }

    pub fn input_shape(&self) -> InputShape {
        self.handle.input_shape()
    }

    pub fn infer(&self, input: &Tensor) -> Result<Tensor, DomainError> {
        self.handle.infer(input)
    }

    /// Whether both point at the same loaded handle
    pub fn same_handle(&self, other: &CachedModel) -> bool {
        Arc::ptr_eq(&self.handle, &other.handle)
    }
}

/// Process-wide cache of loaded, verified models keyed by (symbol, model id)
///
/// One mutex serializes every mutation, including the whole
/// check -> load -> verify -> insert sequence in [`ModelCache::get`], so concurrent
/// misses on one key load once and eviction never races insertion. Inference on
/// returned handles runs outside the lock.
#[derive(Debug)]
pub struct ModelCache {
    registry: Arc<ModelRegistry>,
    loader: Arc<dyn ModelLoader>,
    verifier: Arc<dyn HealthVerifier>,
    config: ModelCacheConfig,
    entries: Mutex<Entries>,
    telemetry: CacheTelemetry,
}

impl ModelCache {
    /// Creates an empty cache, failing fast on invalid configuration
    pub fn new(
        registry: Arc<ModelRegistry>,
        loader: Arc<dyn ModelLoader>,
        verifier: Arc<dyn HealthVerifier>,
        config: ModelCacheConfig,
    ) -> Result<Self, DomainError> {
        config.validate()?;

        Ok(Self {
            registry,
            loader,
            verifier,
            config,
            entries: Mutex::new(HashMap::new()),
            telemetry: CacheTelemetry::new(),
        })
    }

    pub fn config(&self) -> &ModelCacheConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Returns a verified model for `symbol`, loading it on a miss
    ///
    /// Without `model_id` the registry's active model is used. Absence of a
    /// usable model is an expected state and yields `None`; load and
    /// verification failures are logged and counted, never returned.
    pub async fn get(
        &self,
        symbol: &str,
        model_id: Option<&str>,
        force_reload: bool,
    ) -> Option<CachedModel> {
        let symbol = match normalize_symbol(symbol) {
            Ok(symbol) => symbol,
            Err(e) => {
                warn!(symbol, error = %e, "Rejected model request");
                self.telemetry.record_unavailable("invalid");
                return None;
            }
        };

        let mut entries = self.entries.lock().await;

        let Some(record) = self.resolve(&symbol, model_id).await else {
            let pruned = self.prune_unregistered_in(&mut entries, Some(symbol.as_str())).await;

            if pruned > 0 {
                debug!(%symbol, pruned, "Dropped cached models no longer in the registry");
            }

            self.telemetry.record_unavailable(&symbol);
            info!(
                %symbol,
                model_id = model_id.unwrap_or("active"),
                "No model available"
            );
            return None;
        };

        let key = ModelCacheKey::for_record(&record);
        let now = Instant::now();

        if force_reload {
            if entries.remove(&key).is_some() {
                self.telemetry.record_removal(RemovalCause::Replaced, 1);
                debug!(%key, "Discarded cached model for forced reload");
            }
        } else if let Some(model) = self.lookup(&mut entries, &key, now) {
            self.telemetry.record_hit(&symbol);
            return Some(model);
        }

        self.telemetry.record_miss(&symbol);
        self.load_and_insert(&mut entries, record, key).await
    }

    /// Preloads the active model of each symbol, returning how many are now cached
    pub async fn warm_up<I, S>(&self, symbols: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut warmed = 0;

        for symbol in symbols {
            if self.get(symbol.as_ref(), None, false).await.is_some() {
                warmed += 1;
            }
        }

        info!(warmed, "Cache warm-up complete");
        warmed
    }

    /// Drops cached entries for `symbol`: the one for `model_id`, or all of them
    ///
    /// The registry is not touched.
    pub async fn invalidate(&self, symbol: &str, model_id: Option<&str>) -> usize {
        let Ok(symbol) = normalize_symbol(symbol) else {
            return 0;
        };

        let mut entries = self.entries.lock().await;
        let doomed: Vec<ModelCacheKey> = entries
            .keys()
            .filter(|key| key.symbol() == symbol)
            .filter(|key| model_id.is_none_or(|id| key.model_id().as_str() == id))
            .cloned()
            .collect();

        for key in &doomed {
            entries.remove(key);
        }

        self.telemetry
            .record_removal(RemovalCause::Invalidated, doomed.len());
        self.record_occupancy(&entries);

        if !doomed.is_empty() {
            info!(%symbol, removed = doomed.len(), "Invalidated cached models");
        }

        doomed.len()
    }

    /// Empties the cache, returning the number of entries dropped
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let cleared = entries.len();

        entries.clear();
        self.telemetry
            .record_removal(RemovalCause::Invalidated, cleared);
        self.record_occupancy(&entries);

        info!(cleared, "Cleared model cache");
        cleared
    }

    /// Re-verifies every entry, dropping failures and entries whose record is gone
    pub async fn health_check(&self) -> HealthCheckReport {
        let mut entries = self.entries.lock().await;
        let mut report = HealthCheckReport::default();
        let keys: Vec<ModelCacheKey> = entries.keys().cloned().collect();

        for key in keys {
            report.checked += 1;

            if !self.is_registered(&key).await {
                entries.remove(&key);
                self.telemetry
                    .record_removal(RemovalCause::Unregistered, 1);
                warn!(%key, "Dropping cached model no longer in the registry");
                report.unregistered += 1;
                report.removed.push(key.to_string());
                continue;
            }

            let Some(entry) = entries.get_mut(&key) else {
                continue;
            };

            match self.verifier.check(entry.handle().as_ref()) {
                Ok(()) => {
                    entry.set_healthy(true);
                    report.healthy += 1;
                }
                Err(e) => {
                    entries.remove(&key);
                    self.telemetry.record_removal(RemovalCause::Unhealthy, 1);
                    warn!(%key, error = %e, "Dropping cached model that failed health check");
                    report.unhealthy += 1;
                    report.removed.push(key.to_string());
                }
            }
        }

        self.record_occupancy(&entries);
        info!(
            checked = report.checked,
            healthy = report.healthy,
            unhealthy = report.unhealthy,
            unregistered = report.unregistered,
            "Cache health check complete"
        );
        report
    }

    /// Drops entries older than the TTL
    pub async fn sweep_expired(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let expired = self.remove_expired(&mut entries, Instant::now());
        self.record_occupancy(&entries);

        if expired > 0 {
            debug!(expired, "Swept expired cache entries");
        }

        expired
    }

    /// Drops entries whose registry record no longer exists
    pub async fn prune_unregistered(&self) -> usize {
        let mut entries = self.entries.lock().await;
        self.prune_unregistered_in(&mut entries, None).await
    }

    /// Hit/miss, latency and occupancy figures
    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.lock().await;
        let mut stats = self.telemetry.snapshot();

        stats.entries = entries.len();
        stats.max_entries = self.config.max_entries;
        stats.estimated_memory_mb = memory_bytes(&entries) as f64 / BYTES_PER_MB;
        stats.max_memory_mb = self.config.max_memory_mb;
        stats.ttl_secs = self.config.ttl.as_secs();
        stats
    }

    /// Per-entry view, ordered by key
    pub async fn entries(&self) -> Vec<CacheEntryInfo> {
        let entries = self.entries.lock().await;
        let now = Instant::now();
        let mut infos: Vec<(ModelCacheKey, CacheEntryInfo)> = entries
            .values()
            .map(|e| (e.key().clone(), e.info(self.config.ttl, now)))
            .collect();

        infos.sort_by(|a, b| a.0.cmp(&b.0));
        infos.into_iter().map(|(_, info)| info).collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub async fn contains(&self, symbol: &str, model_id: &str) -> bool {
        let (Ok(symbol), Ok(model_id)) = (normalize_symbol(symbol), ModelId::new(model_id)) else {
            return false;
        };

        self.entries
            .lock()
            .await
            .contains_key(&ModelCacheKey::new(symbol, model_id))
    }

    async fn resolve(&self, symbol: &str, model_id: Option<&str>) -> Option<ModelRecord> {
        match model_id {
            Some(id) => {
                let record = self.registry.get(id).await?;

                if record.crypto_symbol() != symbol {
                    warn!(
                        %symbol,
                        model_id = id,
                        owner = %record.crypto_symbol(),
                        "Requested model belongs to another symbol"
                    );
                    return None;
                }

                Some(record)
            }
            None => self.registry.get_active(symbol).await,
        }
    }

    /// Drops entries whose record left the registry, optionally only for one symbol
    async fn prune_unregistered_in(&self, entries: &mut Entries, symbol: Option<&str>) -> usize {
        let keys: Vec<ModelCacheKey> = entries
            .keys()
            .filter(|key| symbol.is_none_or(|s| key.symbol() == s))
            .cloned()
            .collect();
        let mut pruned = 0;

        for key in keys {
            if !self.is_registered(&key).await {
                entries.remove(&key);
                pruned += 1;
            }
        }

        if pruned > 0 {
            self.telemetry
                .record_removal(RemovalCause::Unregistered, pruned);
        }

        self.record_occupancy(entries);
        pruned
    }

    async fn is_registered(&self, key: &ModelCacheKey) -> bool {
        self.registry
            .get(key.model_id().as_str())
            .await
            .is_some_and(|record| record.crypto_symbol() == key.symbol())
    }

    /// Returns a fresh, healthy entry, discarding it if it is neither
    fn lookup(&self, entries: &mut Entries, key: &ModelCacheKey, now: Instant) -> Option<CachedModel> {
        let entry = entries.get_mut(key)?;

        let stale = if entry.is_expired(self.config.ttl, now) {
            Some(RemovalCause::Expired)
        } else if !self.is_entry_healthy(entry) {
            Some(RemovalCause::Unhealthy)
        } else {
            None
        };

        if let Some(cause) = stale {
            entries.remove(key);
            self.telemetry.record_removal(cause, 1);
            debug!(%key, cause = cause.as_str(), "Discarded stale cache entry");
            return None;
        }

        entry.touch(now);
        Some(CachedModel::from_entry(entry))
    }

    fn is_entry_healthy(&self, entry: &mut CacheEntry) -> bool {
        if !entry.is_healthy() {
            return false;
        }

        if self.config.verify_on_hit {
            if let Err(e) = self.verifier.check(entry.handle().as_ref()) {
                warn!(key = %entry.key(), error = %e, "Cached model failed verification on access");
                entry.set_healthy(false);
                return false;
            }
        }

        true
    }

    async fn load_and_insert(
        &self,
        entries: &mut Entries,
        record: ModelRecord,
        key: ModelCacheKey,
    ) -> Option<CachedModel> {
        let symbol = record.crypto_symbol();
        let started = Instant::now();

        let handle = match self.loader.load(&record).await {
            Ok(handle) => handle,
            Err(e) => {
                self.telemetry.record_load_failure(symbol, started.elapsed());
                error!(
                    %key,
                    path = %record.artifact_path().display(),
                    error = %e,
                    "Failed to load model artifact"
                );

                if e.is_artifact_unreadable() {
                    let removed = self.registry.validate().await;

                    if removed > 0 {
                        let pruned = self.prune_unregistered_in(entries, None).await;
                        warn!(
                            removed,
                            pruned,
                            "Registry validation dropped records after unreadable artifact"
                        );
                    }
                }

                return None;
            }
        };

        let load_time = started.elapsed();
        self.telemetry.record_load(symbol, load_time);

        if let Err(e) = self.verifier.check(handle.as_ref()) {
            self.telemetry.record_verification_failure(symbol);
            warn!(%key, error = %e, "Loaded model failed verification, not caching");
            return None;
        }

        let memory = record
            .size_hint_bytes()
            .or_else(|| handle.estimated_size_bytes())
            .unwrap_or(0);

        let now = Instant::now();
        self.make_room(entries, memory, now);

        let mut entry = CacheEntry::new(key.clone(), handle, memory, now);
        entry.touch(now);

        let model = CachedModel::from_entry(&entry);
        entries.insert(key.clone(), entry);
        self.record_occupancy(entries);

        info!(
            %key,
            load_ms = load_time.as_millis() as u64,
            entries = entries.len(),
            "Loaded and cached model"
        );
        Some(model)
    }

    /// Expire-then-LRU pass, run only when inserting `incoming` bytes would exceed a budget
    fn make_room(&self, entries: &mut Entries, incoming: u64, now: Instant) {
        if !self.over_budget(entries, incoming) {
            return;
        }

        self.remove_expired(entries, now);

        if !self.over_budget(entries, incoming) {
            return;
        }

        let mut by_recency: Vec<(Instant, ModelCacheKey)> = entries
            .values()
            .map(|e| (e.last_access_at(), e.key().clone()))
            .collect();
        by_recency.sort();

        let mut evicted = 0;

        for (_, key) in by_recency {
            if !self.over_budget(entries, incoming) {
                break;
            }

            entries.remove(&key);
            evicted += 1;
            debug!(%key, "Evicted least recently used model");
        }

        self.telemetry.record_removal(RemovalCause::Evicted, evicted);

        if self.over_budget(entries, incoming) {
            warn!(
                incoming_bytes = incoming,
                "Model alone exceeds the cache memory budget, caching anyway"
            );
        }
    }

    fn over_budget(&self, entries: &Entries, incoming: u64) -> bool {
        if entries.len() + 1 > self.config.max_entries {
            return true;
        }

        self.config
            .max_memory_bytes()
            .is_some_and(|max| memory_bytes(entries).saturating_add(incoming) > max)
    }

    fn remove_expired(&self, entries: &mut Entries, now: Instant) -> usize {
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(self.config.ttl, now));
        let expired = before - entries.len();

        self.telemetry.record_removal(RemovalCause::Expired, expired);
        expired
    }

    fn record_occupancy(&self, entries: &Entries) {
        record_cache_occupancy(entries.len(), memory_bytes(entries));
    }
}

fn memory_bytes(entries: &Entries) -> u64 {
    entries.values().map(|e| e.estimated_memory_bytes()).sum()
}
