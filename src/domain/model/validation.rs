//! Model identifier and symbol validation utilities

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum length for model IDs
pub const MAX_MODEL_ID_LENGTH: usize = 128;

/// Maximum length for trading symbols
pub const MAX_SYMBOL_LENGTH: usize = 20;

/// Model IDs are file stems: alphanumeric plus `-`, `_` and `.`, no leading separator
static MODEL_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9._-]*$").unwrap());

static SYMBOL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9]+$").unwrap());

/// Model validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ModelValidationError {
    /// Model ID is empty
    EmptyId,
    /// Model ID exceeds maximum length
    IdTooLong { length: usize, max: usize },
    /// Model ID contains invalid characters
    InvalidIdFormat { id: String },
    /// Symbol is empty
    EmptySymbol,
    /// Symbol contains characters other than ASCII letters and digits
    InvalidSymbol { symbol: String },
}

impl fmt::Display for ModelValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "Model ID cannot be empty"),
            Self::IdTooLong { length, max } => {
                write!(f, "Model ID too long: {} characters (max {})", length, max)
            }
            Self::InvalidIdFormat { id } => {
                write!(
                    f,
                    "Invalid model ID format '{}': must be alphanumeric with '-', '_' or '.', starting with a letter or digit",
                    id
                )
            }
            Self::EmptySymbol => write!(f, "Symbol cannot be empty"),
            Self::InvalidSymbol { symbol } => {
                write!(
                    f,
                    "Invalid symbol '{}': must be 1-{} ASCII letters or digits",
                    symbol, MAX_SYMBOL_LENGTH
                )
            }
        }
    }
}

impl std::error::Error for ModelValidationError {}

impl From<ModelValidationError> for crate::domain::DomainError {
    fn from(err: ModelValidationError) -> Self {
        crate::domain::DomainError::validation(err.to_string())
    }
}

/// Validates a model identifier
pub fn validate_model_id(id: &str) -> Result<(), ModelValidationError> {
    if id.is_empty() {
        return Err(ModelValidationError::EmptyId);
    }

    if id.len() > MAX_MODEL_ID_LENGTH {
        return Err(ModelValidationError::IdTooLong {
            length: id.len(),
            max: MAX_MODEL_ID_LENGTH,
        });
    }

    if !MODEL_ID_PATTERN.is_match(id) {
        return Err(ModelValidationError::InvalidIdFormat { id: id.to_string() });
    }

    Ok(())
}

/// Normalizes a trading symbol to its canonical upper-case form
///
/// Symbols are matched case-insensitively everywhere, so `btc` and `BTC`
/// address the same registry entries.
pub fn normalize_symbol(symbol: &str) -> Result<String, ModelValidationError> {
    let normalized = symbol.trim().to_ascii_uppercase();

    if normalized.is_empty() {
        return Err(ModelValidationError::EmptySymbol);
    }

    if normalized.len() > MAX_SYMBOL_LENGTH || !SYMBOL_PATTERN.is_match(&normalized) {
        return Err(ModelValidationError::InvalidSymbol {
            symbol: symbol.to_string(),
        });
    }

    Ok(normalized)
}
