//! PMP Model Cache
//!
//! Keeps trained per-symbol inference models ready to serve:
//! - A persistent registry of model artifacts with one active model per symbol
//! - Discovery of artifacts from a directory by naming convention
//! - A bounded cache of loaded, smoke-tested models with TTL and LRU eviction
//! - Hit/miss and load telemetry exported through `metrics`

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use domain::DomainError;
use infrastructure::artifact::ArtifactLoaderRegistry;
use infrastructure::cache::{spawn_maintenance, MaintenanceHandle, ModelCache, ModelCacheConfig};
use infrastructure::health::SmokeTestVerifier;
use infrastructure::registry::{JsonFileRegistryStore, ModelRegistry};

/// Opens the registry described by `config`, without a cache on top
pub async fn open_registry(config: &AppConfig) -> Arc<ModelRegistry> {
    let store = Arc::new(JsonFileRegistryStore::new(config.registry.state_file.clone()));
    Arc::new(ModelRegistry::open(store, &config.registry).await)
}

/// Wires the registry, artifact loaders and smoke-test verifier into a cache
pub async fn create_model_cache(config: &AppConfig) -> Result<Arc<ModelCache>, DomainError> {
    let cache_config = ModelCacheConfig::try_from(&config.cache)?;
    let registry = open_registry(config).await;

    let cache = ModelCache::new(
        registry,
        Arc::new(ArtifactLoaderRegistry::with_defaults()),
        Arc::new(SmokeTestVerifier::new()),
        cache_config,
    )?;

    Ok(Arc::new(cache))
}

/// Starts periodic maintenance on the configured interval
///
/// Returns `None` when `cache.maintenance_interval_secs` is 0.
pub fn start_maintenance(cache: &Arc<ModelCache>, config: &AppConfig) -> Option<MaintenanceHandle> {
    match config.cache.maintenance_interval_secs {
        0 => None,
        secs => spawn_maintenance(cache.clone(), Duration::from_secs(secs)).ok(),
    }
}
