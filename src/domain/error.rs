use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Artifact unreadable: {path} - {message}")]
    ArtifactUnreadable { path: String, message: String },

    #[error("Verification failed for model '{model_id}': {message}")]
    VerificationFailed { model_id: String, message: String },

    #[error("Persistence error: {message}")]
    Persistence { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn artifact_unreadable(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ArtifactUnreadable {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn verification_failed(model_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::VerificationFailed {
            model_id: model_id.into(),
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error means the artifact behind a record is gone or corrupt
    pub fn is_artifact_unreadable(&self) -> bool {
        matches!(self, Self::ArtifactUnreadable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Model 'btc-lstm-20240101' not found");
        assert_eq!(
            error.to_string(),
            "Not found: Model 'btc-lstm-20240101' not found"
        );
    }

    #[test]
    fn test_artifact_unreadable_error() {
        let error = DomainError::artifact_unreadable("/models/btc.bin", "file missing");
        assert_eq!(
            error.to_string(),
            "Artifact unreadable: /models/btc.bin - file missing"
        );
        assert!(error.is_artifact_unreadable());
    }

    #[test]
    fn test_verification_failed_error() {
        let error = DomainError::verification_failed("eth-gru-20240102", "empty output");
        assert_eq!(
            error.to_string(),
            "Verification failed for model 'eth-gru-20240102': empty output"
        );
        assert!(!error.is_artifact_unreadable());
    }
}
