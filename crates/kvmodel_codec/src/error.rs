//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding a stored record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A timestamp field does not hold an RFC 3339 string.
    #[error("invalid timestamp in field {field}: {value:?}")]
    InvalidTimestamp {
        /// Field name.
        field: String,
        /// The stored text.
        value: String,
    },

    /// A record id is not a positive integer.
    #[error("invalid record id: {value:?}")]
    InvalidId {
        /// The offending text.
        value: String,
    },
}

impl CodecError {
    /// Create an invalid timestamp error.
    pub fn invalid_timestamp(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            field: field.into(),
            value: value.into(),
        }
    }
}
