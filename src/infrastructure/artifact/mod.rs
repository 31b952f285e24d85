//! Artifact infrastructure - on-disk model formats and their loaders

mod binary;
mod dense;
mod json;
mod registry;

pub use binary::{decode_dense_model, encode_dense_model, BinaryArtifactLoader, FORMAT_VERSION, MAGIC};
pub use dense::DenseSequenceModel;
pub use json::{DenseArtifactDocument, JsonArtifactLoader};
pub use registry::ArtifactLoaderRegistry;
