//! Binary artifact format
//!
//! Layout, all little-endian:
//!
//! | field           | type                                   |
//! |-----------------|----------------------------------------|
//! | magic           | `b"PMDL"`                              |
//! | version         | u16 (1)                                |
//! | sequence_length | u32                                    |
//! | feature_count   | u32                                    |
//! | output_size     | u32                                    |
//! | weights         | f32 x sequence_length x features x out |
//! | bias            | f32 x out                              |

use std::sync::Arc;

use async_trait::async_trait;
use bytes::{Buf, BufMut, BytesMut};

use super::dense::DenseSequenceModel;
use crate::domain::model::{InputShape, ModelHandle, ModelRecord};
use crate::domain::{DomainError, ModelLoader};

pub const MAGIC: &[u8; 4] = b"PMDL";
pub const FORMAT_VERSION: u16 = 1;

const HEADER_LEN: usize = 4 + 2 + 4 * 3;

/// Encodes a dense model in the binary artifact layout
pub fn encode_dense_model(model: &DenseSequenceModel) -> Vec<u8> {
    let shape = model.input_shape();
    let mut buf =
        BytesMut::with_capacity(HEADER_LEN + (model.weights().len() + model.bias().len()) * 4);

    buf.put_slice(MAGIC);
    buf.put_u16_le(FORMAT_VERSION);
    buf.put_u32_le(shape.sequence_length as u32);
    buf.put_u32_le(shape.feature_count as u32);
    buf.put_u32_le(model.output_size() as u32);

    for value in model.weights().iter().chain(model.bias()) {
        buf.put_f32_le(*value);
    }

    buf.to_vec()
}

/// Decodes a binary artifact; the message describes what is malformed
pub fn decode_dense_model(model_id: &str, mut buf: &[u8]) -> Result<DenseSequenceModel, String> {
    if buf.remaining() < HEADER_LEN {
        return Err(format!("truncated header ({} bytes)", buf.remaining()));
    }

    let mut magic = [0u8; 4];
    buf.copy_to_slice(&mut magic);

    if &magic != MAGIC {
        return Err("bad magic bytes".to_string());
    }

    let version = buf.get_u16_le();

    if version != FORMAT_VERSION {
        return Err(format!("unsupported format version {}", version));
    }

    let sequence_length = buf.get_u32_le() as usize;
    let feature_count = buf.get_u32_le() as usize;
    let output_size = buf.get_u32_le() as usize;

    let weight_count = sequence_length
        .checked_mul(feature_count)
        .and_then(|n| n.checked_mul(output_size))
        .ok_or("declared dimensions overflow")?;
    let value_count = weight_count
        .checked_add(output_size)
        .ok_or("declared dimensions overflow")?;

    if value_count.checked_mul(4) != Some(buf.remaining()) {
        return Err(format!(
            "expected {} parameter values, found {} bytes",
            value_count,
            buf.remaining()
        ));
    }

    let weights = (0..weight_count).map(|_| buf.get_f32_le()).collect();
    let bias = (0..output_size).map(|_| buf.get_f32_le()).collect();

    DenseSequenceModel::new(
        model_id,
        InputShape::new(sequence_length, feature_count),
        output_size,
        weights,
        bias,
    )
    .map_err(|e| e.to_string())
}

/// Loads `.bin` artifacts
#[derive(Debug, Default)]
pub struct BinaryArtifactLoader;

impl BinaryArtifactLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ModelLoader for BinaryArtifactLoader {
    async fn load(&self, record: &ModelRecord) -> Result<Arc<dyn ModelHandle>, DomainError> {
        let path = record.artifact_path();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| DomainError::artifact_unreadable(path.display().to_string(), e.to_string()))?;

        let model = decode_dense_model(record.model_id().as_str(), &bytes)
            .map_err(|msg| DomainError::artifact_unreadable(path.display().to_string(), msg))?;

        Ok(Arc::new(model))
    }
}
