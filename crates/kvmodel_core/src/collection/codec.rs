//! Entity conversion trait for typed models.

use crate::error::CoreResult;
use kvmodel_codec::{Record, RecordId};

/// A Rust type stored as the records of one model.
///
/// Implementors convert to and from [`Record`]. The id is `None` until the
/// entity has been inserted; [`crate::TypedModel::save`] hands back the
/// entity rebuilt from the stored record, id included.
///
/// # Example
///
/// ```rust
/// use kvmodel_core::{CoreError, CoreResult, Entity, Record, RecordId};
///
/// struct User {
///     id: Option<RecordId>,
///     email: String,
/// }
///
/// impl Entity for User {
///     const MODEL: &'static str = "user";
///
///     fn id(&self) -> Option<RecordId> {
///         self.id
///     }
///
///     fn to_record(&self) -> Record {
///         let record = self.id.map_or_else(Record::new, Record::with_id);
///         record.with("email", self.email.as_str())
///     }
///
///     fn from_record(record: Record) -> CoreResult<Self> {
///         let email = record
///             .text("email")
///             .ok_or_else(|| CoreError::entity("user without email"))?
///             .to_string();
///         Ok(User { id: record.id(), email })
///     }
/// }
/// ```
pub trait Entity: Sized {
    /// Name of the model the entity is stored under.
    const MODEL: &'static str;

    /// The entity's id, once assigned.
    fn id(&self) -> Option<RecordId>;

    /// Converts the entity into a record, id included if assigned.
    fn to_record(&self) -> Record;

    /// Builds the entity from a stored record.
    ///
    /// # Errors
    ///
    /// Returns an `Entity` error if a required field is missing or malformed.
    fn from_record(record: Record) -> CoreResult<Self>;
}
