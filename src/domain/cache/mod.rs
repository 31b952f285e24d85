//! Cache domain - loaded model entries, keys, statistics and loading seams

mod entry;
mod key;
mod loader;
mod stats;

pub use entry::{CacheEntry, CacheEntryInfo, RemovalCause};
pub use key::ModelCacheKey;
pub use loader::{HealthVerifier, ModelLoader};
pub use stats::{CacheStats, HealthCheckReport};

#[cfg(test)]
pub use loader::mock::MockModelLoader;
