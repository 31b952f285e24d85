//! Model record entity and related types

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{normalize_symbol, validate_model_id, ModelValidationError};

/// Model identifier - the artifact file stem, max 128 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelId(String);

impl ModelId {
    /// Create a new ModelId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, ModelValidationError> {
        let id = id.into();
        validate_model_id(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ModelId {
    type Error = ModelValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ModelId> for String {
    fn from(id: ModelId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catalogue entry describing one trained model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    /// Unique identifier
    model_id: ModelId,

    /// Upper-case trading symbol the model was trained for
    crypto_symbol: String,

    /// Model family (e.g. "lstm", "gru")
    model_type: String,

    /// Location of the serialized artifact
    artifact_path: PathBuf,

    /// Evaluation metrics reported by the training pipeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    performance_metrics: Option<BTreeMap<String, f64>>,

    /// Free-form metadata
    #[serde(default)]
    metadata: BTreeMap<String, serde_json::Value>,

    /// Approximate in-memory footprint once loaded, used for cache budgeting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size_hint_bytes: Option<u64>,

    /// Creation timestamp
    created_at: DateTime<Utc>,

    /// Whether this record is the default model for its symbol
    #[serde(default)]
    is_active: bool,
}

impl ModelRecord {
    /// Create a new inactive record
    pub fn new(
        model_id: ModelId,
        crypto_symbol: &str,
        model_type: impl Into<String>,
        artifact_path: impl Into<PathBuf>,
    ) -> Result<Self, ModelValidationError> {
        Ok(Self {
            model_id,
            crypto_symbol: normalize_symbol(crypto_symbol)?,
            model_type: model_type.into(),
            artifact_path: artifact_path.into(),
            performance_metrics: None,
            metadata: BTreeMap::new(),
            size_hint_bytes: None,
            created_at: Utc::now(),
            is_active: false,
        })
    }

    /// Builder-style method to set performance metrics
    pub fn with_performance_metrics(mut self, metrics: BTreeMap<String, f64>) -> Self {
        self.performance_metrics = Some(metrics);
        self
    }

    /// Builder-style method to add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Builder-style method to set the size hint
    pub fn with_size_hint_bytes(mut self, bytes: u64) -> Self {
        self.size_hint_bytes = Some(bytes);
        self
    }

    /// Builder-style method to set the creation timestamp
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn model_id(&self) -> &ModelId {
        &self.model_id
    }

    pub fn crypto_symbol(&self) -> &str {
        &self.crypto_symbol
    }

    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    pub fn performance_metrics(&self) -> Option<&BTreeMap<String, f64>> {
        self.performance_metrics.as_ref()
    }

    pub fn metadata(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.metadata
    }

    pub fn size_hint_bytes(&self) -> Option<u64> {
        self.size_hint_bytes
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Only the registry flips the active flag, together with its active index
    pub(crate) fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    /// Whether the artifact file still exists on disk
    pub fn artifact_exists(&self) -> bool {
        self.artifact_path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ModelRecord {
        ModelRecord::new(
            ModelId::new("btc-lstm-20240101").unwrap(),
            "btc",
            "lstm",
            "/models/btc-lstm-20240101.bin",
        )
        .unwrap()
    }

    #[test]
    fn test_model_id_valid() {
        let id = ModelId::new("btc-lstm-20240101").unwrap();
        assert_eq!(id.as_str(), "btc-lstm-20240101");
        assert_eq!(id.to_string(), "btc-lstm-20240101");
    }

    #[test]
    fn test_model_id_invalid() {
        assert!(ModelId::new("").is_err());
        assert!(ModelId::new("bad id").is_err());
    }

    #[test]
    fn test_record_creation_normalizes_symbol() {
        let record = record();

        assert_eq!(record.crypto_symbol(), "BTC");
        assert_eq!(record.model_type(), "lstm");
        assert!(!record.is_active());
        assert!(record.performance_metrics().is_none());
        assert!(record.metadata().is_empty());
    }

    #[test]
    fn test_record_rejects_invalid_symbol() {
        let result = ModelRecord::new(ModelId::new("x").unwrap(), "", "lstm", "/x.bin");
        assert!(result.is_err());
    }

    #[test]
    fn test_record_builders() {
        let mut metrics = BTreeMap::new();
        metrics.insert("mae".to_string(), 0.12);

        let record = record()
            .with_performance_metrics(metrics)
            .with_metadata("epochs", serde_json::json!(40))
            .with_size_hint_bytes(2048);

        assert_eq!(record.performance_metrics().unwrap()["mae"], 0.12);
        assert_eq!(record.metadata()["epochs"], serde_json::json!(40));
        assert_eq!(record.size_hint_bytes(), Some(2048));
    }

    #[test]
    fn test_record_serialization() {
        let record = record().with_metadata("source", serde_json::json!("discovery"));

        let json = serde_json::to_string(&record).unwrap();
        let restored: ModelRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, record);
    }

    #[test]
    fn test_deserialize_rejects_invalid_model_id() {
        let json = r#"{
            "model_id": "bad id",
            "crypto_symbol": "BTC",
            "model_type": "lstm",
            "artifact_path": "/x.bin",
            "created_at": "2024-01-01T00:00:00Z"
        }"#;

        assert!(serde_json::from_str::<ModelRecord>(json).is_err());
    }
}
