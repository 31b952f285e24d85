//! Model domain - catalogue records and loaded model handles

mod entity;
mod handle;
mod validation;

pub use entity::{ModelId, ModelRecord};
pub use handle::{InputShape, ModelHandle, Tensor};
pub use validation::{
    normalize_symbol, validate_model_id, ModelValidationError, MAX_MODEL_ID_LENGTH,
    MAX_SYMBOL_LENGTH,
};

#[cfg(test)]
pub use handle::mock::MockModelHandle;
