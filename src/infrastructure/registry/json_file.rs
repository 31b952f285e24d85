//! JSON file registry store

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::registry::{RegistrySnapshot, RegistryStore};
use crate::domain::DomainError;

/// Persists the registry snapshot as one pretty-printed JSON document
///
/// Writes go to a sibling `.tmp` file that is then renamed over the target, so a
/// crash mid-write leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct JsonFileRegistryStore {
    path: PathBuf,
}

impl JsonFileRegistryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "registry.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl RegistryStore for JsonFileRegistryStore {
    async fn load(&self) -> Result<Option<RegistrySnapshot>, DomainError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DomainError::persistence(format!(
                    "Failed to read registry file '{}': {}",
                    self.path.display(),
                    e
                )));
            }
        };

        serde_json::from_str(&content).map(Some).map_err(|e| {
            DomainError::persistence(format!(
                "Registry file '{}' is corrupt: {}",
                self.path.display(),
                e
            ))
        })
    }

    async fn save(&self, snapshot: &RegistrySnapshot) -> Result<(), DomainError> {
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| DomainError::persistence(format!("Failed to serialize registry: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DomainError::persistence(format!(
                    "Failed to create registry directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let temp = self.temp_path();

        tokio::fs::write(&temp, json).await.map_err(|e| {
            DomainError::persistence(format!("Failed to write '{}': {}", temp.display(), e))
        })?;

        tokio::fs::rename(&temp, &self.path).await.map_err(|e| {
            DomainError::persistence(format!(
                "Failed to replace registry file '{}': {}",
                self.path.display(),
                e
            ))
        })
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
