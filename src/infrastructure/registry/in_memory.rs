//! In-memory registry store

use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::registry::{RegistrySnapshot, RegistryStore};
use crate::domain::DomainError;

/// Keeps the snapshot in process memory
///
/// Useful for testing and for deployments without a shared filesystem. Data is
/// lost when the process terminates.
#[derive(Debug, Default)]
pub struct InMemoryRegistryStore {
    snapshot: RwLock<Option<RegistrySnapshot>>,
}

impl InMemoryRegistryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with a snapshot
    pub fn with_snapshot(snapshot: RegistrySnapshot) -> Self {
        Self {
            snapshot: RwLock::new(Some(snapshot)),
        }
    }
}

#[async_trait]
impl RegistryStore for InMemoryRegistryStore {
    async fn load(&self) -> Result<Option<RegistrySnapshot>, DomainError> {
        let snapshot = self.snapshot.read().map_err(|e| {
            DomainError::persistence(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(snapshot.clone())
    }

    async fn save(&self, snapshot: &RegistrySnapshot) -> Result<(), DomainError> {
        let mut stored = self.snapshot.write().map_err(|e| {
            DomainError::persistence(format!("Failed to acquire write lock: {}", e))
        })?;

        *stored = Some(snapshot.clone());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_store_loads_none() {
        let store = InMemoryRegistryStore::new();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = InMemoryRegistryStore::new();
        let mut snapshot = RegistrySnapshot::new();
        snapshot.touch();

        store.save(&snapshot).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(snapshot));
    }

    #[tokio::test]
    async fn test_with_snapshot() {
        let store = InMemoryRegistryStore::with_snapshot(RegistrySnapshot::new());
        assert!(store.load().await.unwrap().is_some());
        assert_eq!(store.location(), "memory");
    }
}
