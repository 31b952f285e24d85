//! Infrastructure layer - Concrete loaders, stores and the model cache

pub mod artifact;
pub mod cache;
pub mod health;
pub mod logging;
pub mod observability;
pub mod registry;
