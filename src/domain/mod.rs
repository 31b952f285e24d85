//! Domain layer - Core entities, traits and errors

pub mod cache;
pub mod error;
pub mod model;
pub mod registry;

pub use cache::{
    CacheEntry, CacheEntryInfo, CacheStats, HealthCheckReport, HealthVerifier, ModelCacheKey,
    ModelLoader, RemovalCause,
};
pub use error::DomainError;
pub use model::{
    normalize_symbol, validate_model_id, InputShape, ModelHandle, ModelId, ModelRecord,
    ModelValidationError, Tensor,
};
pub use registry::{ArtifactName, RegistrySnapshot, RegistryStore};
