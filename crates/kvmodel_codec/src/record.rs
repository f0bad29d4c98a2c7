//! Application records.

use crate::value::{RecordId, Value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field recording when a record was inserted.
pub const CREATE_AT: &str = "create_at";
/// Field recording when a record was last updated.
pub const UPDATE_AT: &str = "update_at";

/// A record: an optional id plus named field values.
///
/// Records without an id have not been inserted yet. Field order is the
/// field names' order, which keeps encoding deterministic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    id: Option<RecordId>,
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Creates an empty record without an id.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty record with the given id.
    #[must_use]
    pub fn with_id(id: RecordId) -> Self {
        Self {
            id: Some(id),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Returns the id, if assigned.
    #[must_use]
    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    /// Assigns the id.
    pub fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    /// Returns a field value. Missing fields read as `None`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Sets a field value, returning the previous one.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    /// Removes a field.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Returns true if the field is set, even to `Null`.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Iterates fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Text value of a field.
    #[must_use]
    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_text)
    }

    /// Numeric value of a field.
    #[must_use]
    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(Value::as_number)
    }

    /// Timestamp value of a field.
    #[must_use]
    pub fn timestamp(&self, field: &str) -> Option<DateTime<Utc>> {
        self.get(field).and_then(Value::as_timestamp)
    }

    /// Nested record of an expanded reference field.
    #[must_use]
    pub fn nested(&self, field: &str) -> Option<&Record> {
        self.get(field).and_then(Value::as_record)
    }

    /// Id held by the backing `<field>_id` of a reference field.
    #[must_use]
    pub fn reference_id(&self, field: &str) -> Option<RecordId> {
        self.get(&reference_id_field(field))
            .and_then(Value::as_record_id)
    }

    /// When the record was inserted.
    #[must_use]
    pub fn create_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp(CREATE_AT)
    }

    /// When the record was last updated.
    #[must_use]
    pub fn update_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp(UPDATE_AT)
    }
}

/// Name of the field that stores the id behind reference field `field`.
#[must_use]
pub fn reference_id_field(field: &str) -> String {
    format!("{field}_id")
}
