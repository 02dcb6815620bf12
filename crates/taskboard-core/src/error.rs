//! Error types for the board client

use thiserror::Error;

/// Result type for remote API calls
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Errors raised at the remote API boundary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Request never produced a response
    #[error("network failure: {0}")]
    Network(String),

    /// Server answered with a non-success status
    #[error("server rejected request ({status}): {message}")]
    Status { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("could not decode response: {0}")]
    Decode(String),

    /// Entity carried neither `_id` nor `id`
    #[error("{entity} in response has no identifier")]
    MissingId { entity: &'static str },
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            ApiError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Broad failure categories surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Commit request failed in transit; order was rolled back
    NetworkFailure,
    /// Server rejected the payload; order was rolled back
    ValidationFailure,
    /// Gesture referenced something that is not there; nothing changed
    InvalidGesture,
}

/// Result type for reorder operations
pub type ReorderResult<T> = std::result::Result<T, ReorderError>;

/// Errors raised by the reorder engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReorderError {
    #[error("index {index} out of bounds for {parent} (length {len})")]
    IndexOutOfBounds { parent: String, index: usize, len: usize },

    #[error("unknown parent: {parent}")]
    UnknownParent { parent: String },

    #[error("expected {expected} at index {index} of {parent}, found {found}")]
    EntityMismatch {
        parent: String,
        index: usize,
        expected: String,
        found: String,
    },

    /// Commit failed and the affected parents were restored
    #[error("reorder was not saved: {source}")]
    CommitRejected {
        #[source]
        source: ApiError,
    },
}

impl ReorderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReorderError::CommitRejected {
                source: ApiError::Status { .. },
            } => ErrorKind::ValidationFailure,
            ReorderError::CommitRejected { .. } => ErrorKind::NetworkFailure,
            _ => ErrorKind::InvalidGesture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_mapping() {
        let rejected = ReorderError::CommitRejected {
            source: ApiError::Status {
                status: 422,
                message: "stale stage".into(),
            },
        };
        assert_eq!(rejected.kind(), ErrorKind::ValidationFailure);

        let offline = ReorderError::CommitRejected {
            source: ApiError::Network("offline".into()),
        };
        assert_eq!(offline.kind(), ErrorKind::NetworkFailure);

        let bad = ReorderError::UnknownParent { parent: "x".into() };
        assert_eq!(bad.kind(), ErrorKind::InvalidGesture);
    }

    #[test]
    fn test_error_messages() {
        let err = ReorderError::IndexOutOfBounds {
            parent: "todo".into(),
            index: 4,
            len: 3,
        };
        assert_eq!(err.to_string(), "index 4 out of bounds for todo (length 3)");
    }
}
