//! Model loading and verification seams

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::model::{ModelHandle, ModelRecord};
use crate::domain::DomainError;

/// Turns a catalogued artifact into an in-memory handle
#[async_trait]
pub trait ModelLoader: Send + Sync + Debug {
    /// Loads the artifact behind `record`
    ///
    /// Missing or undecodable files must surface as `DomainError::ArtifactUnreadable`.
    async fn load(&self, record: &ModelRecord) -> Result<Arc<dyn ModelHandle>, DomainError>;
}

/// Liveness check run against a handle before it is served
pub trait HealthVerifier: Send + Sync + Debug {
    /// Runs the check, describing the failure if there is one
    fn check(&self, handle: &dyn ModelHandle) -> Result<(), DomainError>;

    /// True iff the handle passed the check
    fn verify(&self, handle: &dyn ModelHandle) -> bool {
        self.check(handle).is_ok()
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use crate::domain::model::MockModelHandle;

    /// Loader that hands out `MockModelHandle`s and counts loads per model id
    #[derive(Debug, Default)]
    pub struct MockModelLoader {
        loads: Mutex<HashMap<String, usize>>,
        failing: Mutex<HashSet<String>>,
        unhealthy: Mutex<HashSet<String>>,
        size_bytes: Mutex<Option<u64>>,
        handles: Mutex<HashMap<String, Arc<MockModelHandle>>>,
    }

    impl MockModelLoader {
        pub fn new() -> Self {
            Self::default()
        }

        /// Every handle reports this size
        pub fn with_size_bytes(self, bytes: u64) -> Self {
            *self.size_bytes.lock().unwrap() = Some(bytes);
            self
        }

        /// Loads of `model_id` fail as unreadable
        pub fn fail_on(&self, model_id: &str) {
            self.failing.lock().unwrap().insert(model_id.to_string());
        }

        /// Handles for `model_id` are created unhealthy
        pub fn unhealthy_on(&self, model_id: &str) {
            self.unhealthy.lock().unwrap().insert(model_id.to_string());
        }

        pub fn load_count(&self, model_id: &str) -> usize {
            self.loads.lock().unwrap().get(model_id).copied().unwrap_or(0)
        }

        pub fn total_loads(&self) -> usize {
            self.loads.lock().unwrap().values().sum()
        }

        /// Most recent handle handed out for `model_id`
        pub fn last_handle(&self, model_id: &str) -> Option<Arc<MockModelHandle>> {
            self.handles.lock().unwrap().get(model_id).cloned()
        }
    }

    #[async_trait]
    impl ModelLoader for MockModelLoader {
        async fn load(&self, record: &ModelRecord) -> Result<Arc<dyn ModelHandle>, DomainError> {
            let id = record.model_id().to_string();
            *self.loads.lock().unwrap().entry(id.clone()).or_insert(0) += 1;

            if self.failing.lock().unwrap().contains(&id) {
                return Err(DomainError::artifact_unreadable(
                    record.artifact_path().display().to_string(),
                    "mock load failure",
                ));
            }

            let mut handle = MockModelHandle::new(id.clone());

            if let Some(bytes) = *self.size_bytes.lock().unwrap() {
                handle = handle.with_size_bytes(bytes);
            }

            if self.unhealthy.lock().unwrap().contains(&id) {
                handle.set_healthy(false);
            }

            let handle = Arc::new(handle);
            self.handles.lock().unwrap().insert(id, handle.clone());
            Ok(handle as Arc<dyn ModelHandle>)
        }
    }
}
