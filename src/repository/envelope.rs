//! Result envelope returned by every repository operation.

use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use crate::error::{ErrorCode, RepositoryError, Result};

// == Error Info ==
/// Caller-facing view of a failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl From<&RepositoryError> for ErrorInfo {
    fn from(err: &RepositoryError) -> Self {
        let details = match err {
            RepositoryError::Validation { errors, .. } => serde_json::to_value(errors).ok(),
            RepositoryError::NotFound(id) => Some(json!({ "id": id })),
            RepositoryError::Unknown(_) => None,
        };

        Self {
            code: err.code(),
            message: err.to_string(),
            details,
        }
    }
}

// == Repository Result ==
/// `{ data?, error?, loading }`.
///
/// On success `error` is `None`. On failure `data` is `None`, except for
/// deletes of a missing id which report `data = Some(false)` alongside the
/// `NOT_FOUND` error. `loading` is bookkeeping for callers that render a
/// pending state and is always `false` once an operation has returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositoryResult<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_error"
    )]
    pub error: Option<RepositoryError>,
    pub loading: bool,
}

impl<T> RepositoryResult<T> {
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            loading: false,
        }
    }

    pub fn failure(error: RepositoryError) -> Self {
        Self {
            data: None,
            error: Some(error),
            loading: false,
        }
    }

    /// Failure that still carries a data value.
    pub fn failure_with(data: T, error: RepositoryError) -> Self {
        Self {
            data: Some(data),
            error: Some(error),
            loading: false,
        }
    }

    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::failure(err),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        self.error.as_ref().map(RepositoryError::code)
    }

    pub fn error_info(&self) -> Option<ErrorInfo> {
        self.error.as_ref().map(ErrorInfo::from)
    }

    /// Converts back into a `Result` for callers that prefer `?`.
    pub fn into_result(self) -> Result<T> {
        match (self.error, self.data) {
            (Some(err), _) => Err(err),
            (None, Some(data)) => Ok(data),
            (None, None) => Err(RepositoryError::Unknown(
                "Operation returned neither data nor error".to_string(),
            )),
        }
    }

    /// Transforms the data while keeping the outcome.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RepositoryResult<U> {
        RepositoryResult {
            data: self.data.map(f),
            error: self.error,
            loading: self.loading,
        }
    }
}

fn serialize_error<S: Serializer>(
    error: &Option<RepositoryError>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    error.as_ref().map(ErrorInfo::from).serialize(serializer)
}
