//! Artifact loader registry - picks a loader by file extension

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::binary::BinaryArtifactLoader;
use super::json::JsonArtifactLoader;
use crate::domain::model::{ModelHandle, ModelRecord};
use crate::domain::{DomainError, ModelLoader};

/// Dispatches loads to the loader registered for the artifact's extension
#[derive(Debug, Default)]
pub struct ArtifactLoaderRegistry {
    loaders: HashMap<String, Arc<dyn ModelLoader>>,
}

impl ArtifactLoaderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `.bin` and `.json` loaders
    pub fn with_defaults() -> Self {
        Self::new()
            .with_loader("bin", Arc::new(BinaryArtifactLoader::new()))
            .with_loader("json", Arc::new(JsonArtifactLoader::new()))
    }

    /// Register a loader for an extension (case-insensitive, without the dot)
    pub fn with_loader(mut self, extension: &str, loader: Arc<dyn ModelLoader>) -> Self {
        self.loaders.insert(extension.to_ascii_lowercase(), loader);
        self
    }

    /// Extensions with a registered loader, sorted
    pub fn extensions(&self) -> Vec<String> {
        let mut extensions: Vec<String> = self.loaders.keys().cloned().collect();
        extensions.sort();
        extensions
    }

    fn loader_for(&self, record: &ModelRecord) -> Result<&Arc<dyn ModelLoader>, DomainError> {
        let path = record.artifact_path();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        self.loaders.get(&extension).ok_or_else(|| {
            DomainError::artifact_unreadable(
                path.display().to_string(),
                format!("no loader registered for extension '{}'", extension),
            )
        })
    }
}

#[async_trait]
impl ModelLoader for ArtifactLoaderRegistry {
    async fn load(&self, record: &ModelRecord) -> Result<Arc<dyn ModelHandle>, DomainError> {
        self.loader_for(record)?.load(record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockModelLoader;
    use crate::domain::model::{InputShape, ModelId};
    use crate::infrastructure::artifact::{encode_dense_model, DenseSequenceModel};

    fn record(path: &std::path::Path) -> ModelRecord {
        ModelRecord::new(ModelId::new("btc-lstm-20240101").unwrap(), "BTC", "lstm", path).unwrap()
    }

    #[test]
    fn test_default_extensions() {
        let registry = ArtifactLoaderRegistry::with_defaults();
        assert_eq!(registry.extensions(), vec!["bin", "json"]);
    }

    #[tokio::test]
    async fn test_dispatches_by_extension_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("BTC-LSTM-20240101.BIN");
        let model =
            DenseSequenceModel::new("x", InputShape::new(1, 1), 1, vec![1.0], vec![0.0]).unwrap();
        std::fs::write(&path, encode_dense_model(&model)).unwrap();

        let handle = ArtifactLoaderRegistry::with_defaults()
            .load(&record(&path))
            .await
            .unwrap();

        assert_eq!(handle.input_shape(), InputShape::new(1, 1));
    }

    #[tokio::test]
    async fn test_unknown_extension_is_unreadable() {
        let result = ArtifactLoaderRegistry::with_defaults()
            .load(&record(std::path::Path::new("/m/btc.onnx")))
            .await;

        assert!(matches!(result, Err(DomainError::ArtifactUnreadable { .. })));
    }

    #[tokio::test]
    async fn test_custom_loader() {
        let mock = Arc::new(MockModelLoader::new());
        let registry = ArtifactLoaderRegistry::new().with_loader("PT", mock.clone());

        registry
            .load(&record(std::path::Path::new("/m/btc.pt")))
            .await
            .unwrap();

        assert_eq!(mock.load_count("btc-lstm-20240101"), 1);
    }
}
