//! JSON artifact format

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::dense::DenseSequenceModel;
use crate::domain::model::{InputShape, ModelHandle, ModelRecord};
use crate::domain::{DomainError, ModelLoader};

/// On-disk JSON representation of a dense sequence model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseArtifactDocument {
    pub sequence_length: usize,
    pub feature_count: usize,
    pub output_size: usize,
    pub weights: Vec<f32>,
    pub bias: Vec<f32>,
}

impl DenseArtifactDocument {
    pub fn from_model(model: &DenseSequenceModel) -> Self {
        let shape = model.input_shape();
        Self {
            sequence_length: shape.sequence_length,
            feature_count: shape.feature_count,
            output_size: model.output_size(),
            weights: model.weights().to_vec(),
            bias: model.bias().to_vec(),
        }
    }

    pub fn into_model(self, model_id: &str) -> Result<DenseSequenceModel, DomainError> {
        DenseSequenceModel::new(
            model_id,
            InputShape::new(self.sequence_length, self.feature_count),
            self.output_size,
            self.weights,
            self.bias,
        )
    }
}

/// Loads `.json` artifacts
#[derive(Debug, Default)]
pub struct JsonArtifactLoader;

impl JsonArtifactLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ModelLoader for JsonArtifactLoader {
    async fn load(&self, record: &ModelRecord) -> Result<Arc<dyn ModelHandle>, DomainError> {
        let path = record.artifact_path();
        let unreadable = |msg: String| DomainError::artifact_unreadable(path.display().to_string(), msg);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| unreadable(e.to_string()))?;

        let document: DenseArtifactDocument =
            serde_json::from_str(&content).map_err(|e| unreadable(e.to_string()))?;

        let model = document
            .into_model(record.model_id().as_str())
            .map_err(|e| unreadable(e.to_string()))?;

        Ok(Arc::new(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ModelId;

    fn record(path: &std::path::Path) -> ModelRecord {
        ModelRecord::new(ModelId::new("eth-gru-20240102").unwrap(), "ETH", "gru", path).unwrap()
    }

    #[tokio::test]
    async fn test_loader_reads_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eth-gru-20240102.json");
        std::fs::write(
            &path,
            r#"{"sequence_length": 2, "feature_count": 1, "output_size": 1, "weights": [1.0, 2.0], "bias": [0.5]}"#,
        )
        .unwrap();

        let handle = JsonArtifactLoader::new().load(&record(&path)).await.unwrap();

        assert_eq!(handle.input_shape(), InputShape::new(2, 1));
        assert_eq!(handle.output_size(), 1);
        assert_eq!(handle.model_id(), "eth-gru-20240102");
    }

    #[tokio::test]
    async fn test_loader_rejects_inconsistent_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eth-gru-20240102.json");
        std::fs::write(
            &path,
            r#"{"sequence_length": 2, "feature_count": 2, "output_size": 1, "weights": [1.0], "bias": [0.5]}"#,
        )
        .unwrap();

        let result = JsonArtifactLoader::new().load(&record(&path)).await;
        assert!(matches!(result, Err(DomainError::ArtifactUnreadable { .. })));
    }

    #[tokio::test]
    async fn test_loader_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eth-gru-20240102.json");
        std::fs::write(&path, "{").unwrap();

        let result = JsonArtifactLoader::new().load(&record(&path)).await;
        assert!(matches!(result, Err(DomainError::ArtifactUnreadable { .. })));
    }

    #[test]
    fn test_document_from_model() {
        let model = DenseSequenceModel::new("m", InputShape::new(1, 2), 1, vec![1.0, 2.0], vec![0.0])
            .unwrap();

        let document = DenseArtifactDocument::from_model(&model);

        assert_eq!(document.sequence_length, 1);
        assert_eq!(document.feature_count, 2);
        assert_eq!(document.into_model("m").unwrap(), model);
    }
}
