//! Registry domain - model catalogue state and its persistence contract

mod naming;
mod snapshot;
mod store;

pub use naming::{has_artifact_extension, ArtifactName};
pub use snapshot::{RegistrySnapshot, SNAPSHOT_VERSION};
pub use store::RegistryStore;

#[cfg(test)]
pub use store::mock::MockRegistryStore;
