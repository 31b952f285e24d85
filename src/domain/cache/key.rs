//! Cache key for loaded models

use std::fmt;

use crate::domain::model::{ModelId, ModelRecord};

/// Identifies one loaded model: normalized symbol plus model id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelCacheKey {
    symbol: String,
    model_id: ModelId,
}

impl ModelCacheKey {
    /// Builds a key from an already-normalized symbol
    pub fn new(symbol: impl Into<String>, model_id: ModelId) -> Self {
        Self {
            symbol: symbol.into(),
            model_id,
        }
    }

    pub fn for_record(record: &ModelRecord) -> Self {
        Self::new(record.crypto_symbol(), record.model_id().clone())
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn model_id(&self) -> &ModelId {
        &self.model_id
    }
}

impl fmt::Display for ModelCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.symbol, self.model_id)
    }
}
