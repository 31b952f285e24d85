//! Model registry - the catalogue of trained models and the per-symbol active index

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::config::RegistryConfig;
use crate::domain::model::{normalize_symbol, ModelId, ModelRecord};
use crate::domain::registry::{has_artifact_extension, ArtifactName, RegistrySnapshot, RegistryStore};
use crate::domain::DomainError;
use crate::infrastructure::observability::{
    record_registry_discovered, record_registry_persist_failure, record_registry_pruned,
};

/// Process-wide model catalogue
///
/// All mutations hold the write lock through the following persistence write, so
/// readers never observe a half-applied activation and the persisted document
/// always reflects a complete mutation. A failed write is logged and the
/// in-memory state stays authoritative until the next successful write.
#[derive(Debug)]
pub struct ModelRegistry {
    state: RwLock<RegistrySnapshot>,
    store: Arc<dyn RegistryStore>,
}

impl ModelRegistry {
    /// Creates an empty registry backed by `store`, without reading it
    pub fn new(store: Arc<dyn RegistryStore>) -> Self {
        Self {
            state: RwLock::new(RegistrySnapshot::new()),
            store,
        }
    }

    /// Loads the persisted snapshot and applies the configured startup passes
    ///
    /// A missing or corrupt document is treated as an empty catalogue.
    pub async fn open(store: Arc<dyn RegistryStore>, config: &RegistryConfig) -> Self {
        let mut snapshot = match store.load().await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                info!(location = %store.location(), "No persisted registry found, starting empty");
                RegistrySnapshot::new()
            }
            Err(e) => {
                error!(location = %store.location(), error = %e, "Failed to load registry, starting empty");
                RegistrySnapshot::new()
            }
        };

        let fixes = snapshot.heal();

        if fixes > 0 {
            warn!(fixes, "Repaired inconsistent active index in persisted registry");
        }

        let registry = Self {
            state: RwLock::new(snapshot),
            store,
        };

        if config.discover_on_startup {
            if let Err(e) = registry.discover(&config.artifact_dir).await {
                error!(dir = %config.artifact_dir.display(), error = %e, "Startup discovery failed");
            }
        }

        if config.validate_on_startup {
            registry.validate().await;
        }

        let models = registry.len().await;
        info!(models, "Model registry ready");
        registry
    }

    /// Catalogues artifacts in `dir` that are not yet known, returning how many were added
    ///
    /// Files are matched by name; a file already catalogued by id or path is skipped,
    /// so re-running over an unchanged directory adds nothing.
    pub async fn discover(&self, dir: &Path) -> Result<usize, DomainError> {
        let candidates = match scan_artifacts(dir).await {
            Ok(candidates) => candidates,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(dir = %dir.display(), "Artifact directory does not exist");
                return Ok(0);
            }
            Err(e) => {
                return Err(DomainError::internal(format!(
                    "Failed to scan '{}': {}",
                    dir.display(),
                    e
                )));
            }
        };

        let mut state = self.state.write().await;
        let mut added = 0;

        for candidate in candidates {
            let known = state.contains(&candidate.name.model_id)
                || state
                    .records()
                    .any(|r| r.artifact_path() == candidate.path.as_path());

            if known {
                continue;
            }

            let created_at = candidate
                .name
                .created_at
                .or(candidate.modified)
                .unwrap_or_else(Utc::now);

            let record = ModelRecord::new(
                candidate.name.model_id.clone(),
                &candidate.name.symbol,
                candidate.name.model_type.clone(),
                candidate.path.clone(),
            )?
            .with_created_at(created_at)
            .with_size_hint_bytes(candidate.size_bytes)
            .with_metadata("source", serde_json::json!("discovery"))
            .with_metadata("format", serde_json::json!(candidate.name.extension));

            debug!(
                model_id = %candidate.name.model_id,
                symbol = %candidate.name.symbol,
                path = %candidate.path.display(),
                "Discovered artifact"
            );

            state.upsert(record);
            added += 1;
        }

        if added > 0 {
            self.persist(&mut state).await;
            record_registry_discovered(added);
            info!(added, dir = %dir.display(), "Registered discovered artifacts");
        }

        Ok(added)
    }

    /// Inserts or replaces a record by id
    ///
    /// Registration never changes which model is active.
    pub async fn register(&self, record: ModelRecord) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let model_id = record.model_id().clone();
        let symbol = record.crypto_symbol().to_string();

        let replaced = state.upsert(record).is_some();
        self.persist(&mut state).await;

        info!(%model_id, %symbol, replaced, "Registered model");
        Ok(())
    }

    /// Makes `model_id` the single active model for `symbol`
    pub async fn set_active(&self, symbol: &str, model_id: &str) -> Result<(), DomainError> {
        let symbol = normalize_symbol(symbol)?;
        let model_id = ModelId::new(model_id)
            .map_err(|_| DomainError::not_found(format!("Model '{}' not found", model_id)))?;

        let mut state = self.state.write().await;
        let previous = state.active_id(&symbol).cloned();

        state.activate(&symbol, &model_id)?;
        self.persist(&mut state).await;

        info!(
            %symbol,
            %model_id,
            previous = previous.as_ref().map(|id| id.as_str()).unwrap_or("none"),
            "Activated model"
        );
        Ok(())
    }

    /// Active record for a symbol, if one is designated
    pub async fn get_active(&self, symbol: &str) -> Option<ModelRecord> {
        let symbol = normalize_symbol(symbol).ok()?;
        self.state.read().await.active(&symbol).cloned()
    }

    /// Active model id for a symbol
    pub async fn active_model_id(&self, symbol: &str) -> Option<ModelId> {
        let symbol = normalize_symbol(symbol).ok()?;
        self.state.read().await.active_id(&symbol).cloned()
    }

    /// Record by id
    pub async fn get(&self, model_id: &str) -> Option<ModelRecord> {
        let model_id = ModelId::new(model_id).ok()?;
        self.state.read().await.get(&model_id).cloned()
    }

    /// Records for a symbol, newest first
    pub async fn list_for_symbol(&self, symbol: &str) -> Vec<ModelRecord> {
        let Ok(symbol) = normalize_symbol(symbol) else {
            return Vec::new();
        };

        self.state
            .read()
            .await
            .for_symbol(&symbol)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn list_all(&self) -> Vec<ModelRecord> {
        self.state.read().await.records().cloned().collect()
    }

    pub async fn symbols(&self) -> Vec<String> {
        self.state.read().await.symbols()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.is_empty()
    }

    /// Removes a record, clearing the active index entry it held
    pub async fn unregister(&self, model_id: &str) -> Result<bool, DomainError> {
        let Ok(model_id) = ModelId::new(model_id) else {
            return Ok(false);
        };

        let mut state = self.state.write().await;
        let removed = state.remove(&model_id);

        if let Some(record) = &removed {
            self.persist(&mut state).await;
            info!(%model_id, symbol = %record.crypto_symbol(), "Unregistered model");
        }

        Ok(removed.is_some())
    }

    /// Drops records whose artifact file no longer exists, returning how many were removed
    pub async fn validate(&self) -> usize {
        let mut state = self.state.write().await;
        let removed = state.remove_where(|r| !r.artifact_exists());

        for record in &removed {
            warn!(
                model_id = %record.model_id(),
                symbol = %record.crypto_symbol(),
                path = %record.artifact_path().display(),
                was_active = record.is_active(),
                "Removing model whose artifact is missing"
            );
        }

        if !removed.is_empty() {
            self.persist(&mut state).await;
            record_registry_pruned(removed.len());
        }

        removed.len()
    }

    /// Point-in-time copy of the whole catalogue
    pub async fn snapshot(&self) -> RegistrySnapshot {
        self.state.read().await.clone()
    }

    async fn persist(&self, state: &mut RegistrySnapshot) -> bool {
        state.touch();

        match self.store.save(state).await {
            Ok(()) => true,
            Err(e) => {
                record_registry_persist_failure();
                error!(
                    location = %self.store.location(),
                    error = %e,
                    "Failed to persist model registry; in-memory state remains authoritative"
                );
                false
            }
        }
    }
}

struct ArtifactCandidate {
    name: ArtifactName,
    path: PathBuf,
    size_bytes: u64,
    modified: Option<DateTime<Utc>>,
}

async fn scan_artifacts(dir: &Path) -> std::io::Result<Vec<ArtifactCandidate>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut candidates = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let metadata = entry.metadata().await?;

        if !metadata.is_file() || !has_artifact_extension(&path) {
            continue;
        }

        let Some(name) = ArtifactName::parse(&path) else {
            debug!(path = %path.display(), "Skipping file outside the artifact naming convention");
            continue;
        };

        candidates.push(ArtifactCandidate {
            name,
            path,
            size_bytes: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        });
    }

    candidates.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(candidates)
}
