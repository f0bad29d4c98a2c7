//! Error types for kvmodel core.

use kvmodel_codec::{CodecError, RecordId};
use kvmodel_storage::StorageError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in kvmodel core operations.
///
/// An unresolved reference is not an error: relation expansion turns it
/// into [`kvmodel_codec::Value::Null`].
#[derive(Debug, Error)]
pub enum CoreError {
    /// Key-value store error, surfaced unchanged.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A stored record could not be decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The call violates an operation's precondition.
    #[error("precondition failed: {message}")]
    Precondition {
        /// Description of the violated precondition.
        message: String,
    },

    /// No record exists under the given id.
    #[error("record not found: {model}:{id}")]
    NotFound {
        /// Model searched.
        model: String,
        /// The id that was not found.
        id: RecordId,
    },

    /// Every id handed out during an insert collided with an existing record.
    #[error("id allocation for model {model} collided {attempts} times")]
    AllocationCollisionExhausted {
        /// Model being inserted into.
        model: String,
        /// Number of ids tried.
        attempts: u32,
    },

    /// The registry has no model with this name.
    #[error("model not found: {name}")]
    ModelNotFound {
        /// Requested model name.
        name: String,
    },

    /// A model declaration is invalid.
    #[error("invalid schema: {message}")]
    Schema {
        /// Description of the problem.
        message: String,
    },

    /// The primary record was written but its indices were not.
    #[error("record {model}:{id} written but secondary structures failed: {source}")]
    SecondaryWrite {
        /// Model written.
        model: String,
        /// Record id written.
        id: RecordId,
        /// The batch failure.
        #[source]
        source: StorageError,
    },

    /// The operation is declared but not supported.
    #[error("unsupported: {feature}")]
    Unsupported {
        /// The unsupported feature.
        feature: String,
    },

    /// A blob collaborator failed.
    #[error("blob error on field {field}: {message}")]
    Blob {
        /// Blob field.
        field: String,
        /// Description of the failure.
        message: String,
    },

    /// A typed entity could not be built from a record.
    #[error("entity conversion failed: {message}")]
    Entity {
        /// Description of the failure.
        message: String,
    },
}

impl CoreError {
    /// Creates a precondition error.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(model: impl Into<String>, id: RecordId) -> Self {
        Self::NotFound {
            model: model.into(),
            id,
        }
    }

    /// Creates a schema error.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Creates an unsupported-feature error.
    pub fn unsupported(feature: impl Into<String>) -> Self {
        Self::Unsupported {
            feature: feature.into(),
        }
    }

    /// Creates a blob error.
    pub fn blob(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Blob {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an entity conversion error.
    pub fn entity(message: impl Into<String>) -> Self {
        Self::Entity {
            message: message.into(),
        }
    }

    /// Returns true if this is a [`CoreError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
