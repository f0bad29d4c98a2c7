//! Dynamic field values and record identifiers.

use crate::error::CodecError;
use crate::record::Record;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a record within its model's namespace.
///
/// Ids are positive integers handed out by the id allocator, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    /// Creates a record id.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u64>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(CodecError::InvalidId {
                value: s.to_string(),
            }),
        }
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<RecordId> for u64 {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

/// A typed field value.
///
/// Numbers are `f64`, as the store keeps every number as text and sorted-set
/// scores are doubles. `Record` only appears in expanded results, where a
/// reference field has been replaced by the object it points at.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    /// Explicitly absent.
    #[default]
    Null,
    /// Numeric value.
    Number(f64),
    /// Point in time, UTC.
    Timestamp(DateTime<Utc>),
    /// Text, returned as stored.
    Text(String),
    /// A nested record produced by relation expansion.
    Record(Box<Record>),
}

impl Value {
    /// Returns true for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if the value carries something: not null, not empty text.
    #[must_use]
    pub fn is_present(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Text(text) => !text.is_empty(),
            _ => true,
        }
    }

    /// Returns the number, if this is one.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text, if this is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the timestamp, if this is one.
    #[must_use]
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Returns the nested record, if this is one.
    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Interprets the value as a record id.
    ///
    /// Accepts whole positive numbers and text holding one.
    #[must_use]
    pub fn as_record_id(&self) -> Option<RecordId> {
        match self {
            Value::Number(n) if *n >= 1.0 && n.fract() == 0.0 && *n <= u64::MAX as f64 => {
                Some(RecordId::new(*n as u64))
            }
            Value::Text(text) => text.parse().ok(),
            Value::Record(record) => record.id(),
            _ => None,
        }
    }

    /// The flat string form kept in the store.
    ///
    /// Timestamps use RFC 3339 with millisecond precision in UTC, which sorts
    /// lexicographically in time order. `Null` and nested records have no
    /// flat form.
    #[must_use]
    pub fn to_field_string(&self) -> Option<String> {
        match self {
            Value::Null | Value::Record(_) => None,
            Value::Number(n) => Some(n.to_string()),
            Value::Timestamp(ts) => Some(format_timestamp(ts)),
            Value::Text(text) => Some(text.clone()),
        }
    }

    /// Sorted-set score derived from the value.
    ///
    /// Timestamps score as epoch milliseconds, numbers as themselves and
    /// numeric text as the number it spells. Anything else scores 0.
    #[must_use]
    pub fn score(&self) -> f64 {
        match self {
            Value::Timestamp(ts) => ts.timestamp_millis() as f64,
            Value::Number(n) if !n.is_nan() => *n,
            Value::Text(text) => parse_number(text),
            _ => 0.0,
        }
    }
}

/// Parses stored numeric text, falling back to 0.
pub(crate) fn parse_number(text: &str) -> f64 {
    match text.trim().parse::<f64>() {
        Ok(n) if !n.is_nan() => n,
        _ => 0.0,
    }
}

/// Formats a timestamp the way it is stored.
#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<RecordId> for Value {
    fn from(id: RecordId) -> Self {
        Value::Number(id.as_u64() as f64)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::Timestamp(ts)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(Box::new(record))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
