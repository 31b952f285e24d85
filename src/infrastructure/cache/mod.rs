//! Loaded model cache

mod config;
mod maintenance;
mod model_cache;

pub use config::ModelCacheConfig;
pub use maintenance::{spawn_maintenance, MaintenanceHandle};
pub use model_cache::{CachedModel, ModelCache};
