//! Dense sequence model adapter

use crate::domain::model::{InputShape, ModelHandle, Tensor};
use crate::domain::DomainError;

/// Linear read-out over a flattened `(sequence_length x feature_count)` window
///
/// `weights` is row-major `[output_size, sequence_length * feature_count]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseSequenceModel {
    model_id: String,
    shape: InputShape,
    output_size: usize,
    weights: Vec<f32>,
    bias: Vec<f32>,
}

impl DenseSequenceModel {
    pub fn new(
        model_id: impl Into<String>,
        shape: InputShape,
        output_size: usize,
        weights: Vec<f32>,
        bias: Vec<f32>,
    ) -> Result<Self, DomainError> {
        if shape.is_empty() {
            return Err(DomainError::validation(format!(
                "Input shape {}x{} is empty",
                shape.sequence_length, shape.feature_count
            )));
        }

        if output_size == 0 {
            return Err(DomainError::validation("Output size must be positive"));
        }

        let expected = shape
            .len()
            .checked_mul(output_size)
            .ok_or_else(|| DomainError::validation("Weight matrix size overflows"))?;

        if weights.len() != expected {
            return Err(DomainError::validation(format!(
                "Expected {} weights, got {}",
                expected,
                weights.len()
            )));
        }

        if bias.len() != output_size {
            return Err(DomainError::validation(format!(
                "Expected {} bias values, got {}",
                output_size,
                bias.len()
            )));
        }

        Ok(Self {
            model_id: model_id.into(),
            shape,
            output_size,
            weights,
            bias,
        })
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn bias(&self) -> &[f32] {
        &self.bias
    }
}

impl ModelHandle for DenseSequenceModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn input_shape(&self) -> InputShape {
        self.shape
    }

    fn output_size(&self) -> usize {
        self.output_size
    }

    fn infer(&self, input: &Tensor) -> Result<Tensor, DomainError> {
        let width = self.shape.len();

        if input.len() != width {
            return Err(DomainError::validation(format!(
                "Model '{}' expects {}x{} input, got shape {:?}",
                self.model_id,
                self.shape.sequence_length,
                self.shape.feature_count,
                input.shape()
            )));
        }

        let values = input.data();
        let output = self
            .weights
            .chunks_exact(width)
            .zip(&self.bias)
            .map(|(row, bias)| bias + row.iter().zip(values).map(|(w, x)| w * x).sum::<f32>())
            .collect();

        Tensor::new(vec![self.output_size], output)
    }

    fn estimated_size_bytes(&self) -> Option<u64> {
        Some(((self.weights.len() + self.bias.len()) * std::mem::size_of::<f32>()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> DenseSequenceModel {
        DenseSequenceModel::new(
            "btc-dense",
            InputShape::new(2, 2),
            2,
            vec![1.0, 1.0, 1.0, 1.0, 0.5, 0.0, 0.0, -0.5],
            vec![0.0, 1.0],
        )
        .unwrap()
    }

    #[test]
    fn test_infer() {
        let input = Tensor::new(vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let output = model().infer(&input).unwrap();

        assert_eq!(output.shape(), &[2]);
        assert_eq!(output.data(), &[10.0, -0.5]);
    }

    #[test]
    fn test_infer_rejects_wrong_shape() {
        let input = Tensor::zeros(vec![3, 2]);
        assert!(model().infer(&input).is_err());
    }

    #[test]
    fn test_new_validates_dimensions() {
        let shape = InputShape::new(2, 2);

        assert!(DenseSequenceModel::new("m", shape, 1, vec![0.0; 3], vec![0.0]).is_err());
        assert!(DenseSequenceModel::new("m", shape, 1, vec![0.0; 4], vec![]).is_err());
        assert!(DenseSequenceModel::new("m", shape, 0, vec![], vec![]).is_err());
        assert!(
            DenseSequenceModel::new("m", InputShape::new(0, 2), 1, vec![], vec![0.0]).is_err()
        );
    }

    #[test]
    fn test_estimated_size() {
        assert_eq!(model().estimated_size_bytes(), Some(40));
    }
}
