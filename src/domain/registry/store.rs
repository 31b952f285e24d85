//! Registry persistence trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::RegistrySnapshot;
use crate::domain::DomainError;

/// Backing store for the registry snapshot, read once at startup and rewritten
/// wholesale after every mutation
#[async_trait]
pub trait RegistryStore: Send + Sync + Debug {
    /// Loads the persisted snapshot; `Ok(None)` when nothing has been written yet
    async fn load(&self) -> Result<Option<RegistrySnapshot>, DomainError>;

    /// Replaces the persisted snapshot
    async fn save(&self, snapshot: &RegistrySnapshot) -> Result<(), DomainError>;

    /// Human readable location, for logs
    fn location(&self) -> String;
}
