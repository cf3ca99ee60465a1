//! Error types for the content store
//!
//! Provides unified error handling using thiserror.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::repository::ValidationError;

// == Error Code ==
/// Machine-readable failure category surfaced in the result envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input rejected by the validator; the caller can correct and retry
    ValidationError,
    /// An id-keyed operation targeted an absent entity
    NotFound,
    /// Anything else, wrapping the underlying message
    UnknownError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Repository Error Enum ==
/// Failure of a repository operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    /// Input failed validation
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        errors: Vec<ValidationError>,
    },

    /// No entity with the given id
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Unexpected failure, usually from the backing store
    #[error("{0}")]
    Unknown(String),
}

impl RepositoryError {
    /// Builds a validation error from a non-empty error list.
    pub fn validation(errors: Vec<ValidationError>) -> Self {
        let message = errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        RepositoryError::Validation { message, errors }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            RepositoryError::Validation { .. } => ErrorCode::ValidationError,
            RepositoryError::NotFound(_) => ErrorCode::NotFound,
            RepositoryError::Unknown(_) => ErrorCode::UnknownError,
        }
    }
}

impl From<StoreError> for RepositoryError {
    fn from(err: StoreError) -> Self {
        RepositoryError::Unknown(err.to_string())
    }
}

// == Store Error Enum ==
/// Failure of the backing store behind a repository.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to load collection: {0}")]
    Load(String),

    #[error("Failed to save collection: {0}")]
    Save(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == Registry Error Enum ==
/// Misconfiguration when asking the registry for a repository.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),
}

// == Result Type Alias ==
/// Convenience Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::ValidationErrorKind;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            RepositoryError::NotFound("x".into()).code(),
            ErrorCode::NotFound
        );
        assert_eq!(
            RepositoryError::Unknown("boom".into()).code(),
            ErrorCode::UnknownError
        );
        assert_eq!(RepositoryError::validation(vec![]).code(), ErrorCode::ValidationError);
    }

    #[test]
    fn test_error_code_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorCode::ValidationError).unwrap();
        assert_eq!(json, "\"VALIDATION_ERROR\"");
        assert_eq!(ErrorCode::NotFound.to_string(), "NOT_FOUND");
    }

    #[test]
    fn test_validation_message_joins_errors() {
        let err = RepositoryError::validation(vec![
            ValidationError::new(ValidationErrorKind::Required, "Title is required").field("title"),
            ValidationError::new(ValidationErrorKind::InvalidFormat, "Bad URL").field("live_url"),
        ]);
        assert_eq!(err.to_string(), "Validation failed: Title is required; Bad URL");
    }

    #[test]
    fn test_store_error_becomes_unknown() {
        let err: RepositoryError = StoreError::Save("disk full".into()).into();
        assert_eq!(err.code(), ErrorCode::UnknownError);
        assert!(err.to_string().contains("disk full"));
    }
}
