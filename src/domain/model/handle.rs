//! Loaded model handle abstraction

use std::fmt::Debug;

use serde::Serialize;

use crate::domain::DomainError;

/// Input window a model expects: `sequence_length` time steps of `feature_count` features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InputShape {
    pub sequence_length: usize,
    pub feature_count: usize,
}

impl InputShape {
    pub fn new(sequence_length: usize, feature_count: usize) -> Self {
        Self {
            sequence_length,
            feature_count,
        }
    }

    /// Number of scalar values in one input window
    pub fn len(&self) -> usize {
        self.sequence_length * self.feature_count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Dense row-major `f32` tensor
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl Tensor {
    /// Creates a tensor, checking that `data` fills `shape` exactly
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self, DomainError> {
        let expected: usize = shape.iter().product();

        if expected != data.len() {
            return Err(DomainError::validation(format!(
                "Tensor shape {:?} needs {} values, got {}",
                shape,
                expected,
                data.len()
            )));
        }

        Ok(Self { shape, data })
    }

    pub fn zeros(shape: Vec<usize>) -> Self {
        let len = shape.iter().product();
        Self {
            shape,
            data: vec![0.0; len],
        }
    }

    /// Fills the tensor by calling `f` with each flat index
    pub fn from_fn(shape: Vec<usize>, f: impl FnMut(usize) -> f32) -> Self {
        let len = shape.iter().product();
        Self {
            shape,
            data: (0..len).map(f).collect(),
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A loaded, inference-ready model
///
/// Handles are immutable once loaded and `infer` takes `&self`, so a single
/// handle may serve concurrent callers without extra locking.
pub trait ModelHandle: Send + Sync + Debug {
    /// Identifier of the record this handle was loaded from
    fn model_id(&self) -> &str;

    /// Declared input window shape
    fn input_shape(&self) -> InputShape;

    /// Number of values produced per inference
    fn output_size(&self) -> usize;

    /// Runs one forward pass over an input of shape `[sequence_length, feature_count]`
    fn infer(&self, input: &Tensor) -> Result<Tensor, DomainError>;

    /// Approximate resident size, if the adapter can tell
    fn estimated_size_bytes(&self) -> Option<u64> {
        None
    }
}
