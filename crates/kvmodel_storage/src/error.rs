//! Error types for storage operations.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    /// The backend failed to serve the request.
    #[error("backend error: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
    },

    /// The key holds a value of another kind.
    #[error("wrong type for key {key}: expected {expected}")]
    WrongType {
        /// The offending key.
        key: String,
        /// The kind the operation expected.
        expected: &'static str,
    },

    /// The key holds a string that is not an integer.
    #[error("value at key {key} is not an integer")]
    NotAnInteger {
        /// The offending key.
        key: String,
    },

    /// A batched operation failed part way through.
    #[error("batch failed at operation {index}: {message}")]
    BatchFailed {
        /// Position of the failing operation in the batch.
        index: usize,
        /// Description of the failure.
        message: String,
    },
}

impl StorageError {
    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Creates a wrong-type error.
    pub fn wrong_type(key: impl Into<String>, expected: &'static str) -> Self {
        Self::WrongType {
            key: key.into(),
            expected,
        }
    }
}
