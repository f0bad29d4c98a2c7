//! Record encoding to and from flat field maps.

use crate::error::{CodecError, CodecResult};
use crate::record::Record;
use crate::value::{parse_number, RecordId, Value};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// The flat field-to-string form a record takes in the store.
pub type FieldMap = BTreeMap<String, String>;

/// Declared type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Stored as a decimal string, decoded to a number.
    Numeric,
    /// Stored as an RFC 3339 string, decoded to a timestamp.
    Timestamp,
    /// Points at a record of the named model through `<field>_id`.
    Reference(String),
    /// Content kept outside the primary record.
    Opaque,
}

impl FieldType {
    /// Creates a reference to `model`.
    pub fn reference(model: impl Into<String>) -> Self {
        FieldType::Reference(model.into())
    }

    /// Target model of a reference.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            FieldType::Reference(model) => Some(model),
            _ => None,
        }
    }

    /// Returns true if values of this type are kept out of the primary record.
    #[must_use]
    pub fn is_derived(&self) -> bool {
        matches!(self, FieldType::Reference(_) | FieldType::Opaque)
    }
}

/// Declared field types of a model.
///
/// Fields without a declaration are untyped: stored and returned as text.
pub type FieldTypes = BTreeMap<String, FieldType>;

/// Encodes a record into its stored field map.
///
/// - Timestamp fields become RFC 3339 strings
/// - Numeric and untyped fields are written as their string form
/// - Reference and opaque fields carrying a value are dropped: they hold
///   joined or externally stored data, not primary-record content
/// - `Null` fields are never written
///
/// The id is not part of the map; it is carried by the record's key.
#[must_use]
pub fn encode_record(types: &FieldTypes, record: &Record) -> FieldMap {
    let mut map = FieldMap::new();
    for (field, value) in record.fields() {
        if value.is_null() {
            continue;
        }
        if let Some(ty) = types.get(field) {
            if ty.is_derived() && value.is_present() {
                continue;
            }
        }
        if let Some(text) = value.to_field_string() {
            map.insert(field.to_string(), text);
        }
    }
    map
}

/// Decodes a stored field map back into a record.
///
/// Numeric fields that do not parse decode to 0. Timestamp fields must
/// hold RFC 3339 text. Everything else is returned as text, unchanged.
///
/// # Errors
///
/// Returns [`CodecError::InvalidTimestamp`] if a timestamp field is malformed.
pub fn decode_record(types: &FieldTypes, id: RecordId, map: FieldMap) -> CodecResult<Record> {
    let mut record = Record::with_id(id);
    for (field, text) in map {
        let value = match types.get(&field) {
            Some(FieldType::Numeric) => Value::Number(parse_number(&text)),
            Some(FieldType::Timestamp) => Value::Timestamp(parse_timestamp(&field, &text)?),
            _ => Value::Text(text),
        };
        record.set(field, value);
    }
    Ok(record)
}

fn parse_timestamp(field: &str, text: &str) -> CodecResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| CodecError::invalid_timestamp(field, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn user_types() -> FieldTypes {
        let mut types = FieldTypes::new();
        types.insert("age".into(), FieldType::Numeric);
        types.insert("create_at".into(), FieldType::Timestamp);
        types.insert("invitor".into(), FieldType::reference("user"));
        types.insert("avatar".into(), FieldType::Opaque);
        types
    }

    #[test]
    fn encode_converts_and_strips() {
        let ts = Utc.timestamp_millis_opt(1_000).unwrap();
        let record = Record::new()
            .with("username", "a")
            .with("age", 30)
            .with("create_at", ts)
            .with("invitor", Record::with_id(RecordId::new(2)))
            .with("invitor_id", 2)
            .with("avatar", "blob-bytes")
            .with("nickname", Value::Null);

        let map = encode_record(&user_types(), &record);

        assert_eq!(map.get("username").map(String::as_str), Some("a"));
        assert_eq!(map.get("age").map(String::as_str), Some("30"));
        assert_eq!(
            map.get("create_at").map(String::as_str),
            Some("1970-01-01T00:00:01.000Z")
        );
        assert_eq!(map.get("invitor_id").map(String::as_str), Some("2"));
        assert!(!map.contains_key("invitor"));
        assert!(!map.contains_key("avatar"));
        assert!(!map.contains_key("nickname"));
    }

    #[test]
    fn encode_does_not_touch_input() {
        let record = Record::new().with("invitor", Record::with_id(RecordId::new(2)));
        let _ = encode_record(&user_types(), &record);
        assert!(record.nested("invitor").is_some());
    }

    #[test]
    fn decode_types_fields() {
        let mut map = FieldMap::new();
        map.insert("age".into(), "41".into());
        map.insert("create_at".into(), "2024-05-01T10:00:00.250Z".into());
        map.insert("username".into(), "b".into());

        let record = decode_record(&user_types(), RecordId::new(9), map).unwrap();

        assert_eq!(record.id(), Some(RecordId::new(9)));
        assert_eq!(record.number("age"), Some(41.0));
        assert_eq!(
            record.create_at(),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
                + chrono::Duration::milliseconds(250))
        );
        assert_eq!(record.text("username"), Some("b"));
    }

    #[test]
    fn non_numeric_decodes_to_zero() {
        let mut map = FieldMap::new();
        map.insert("age".into(), "old".into());
        let record = decode_record(&user_types(), RecordId::new(1), map).unwrap();
        assert_eq!(record.number("age"), Some(0.0));
    }

    #[test]
    fn malformed_timestamp_is_an_error() {
        let mut map = FieldMap::new();
        map.insert("create_at".into(), "yesterday".into());
        let result = decode_record(&user_types(), RecordId::new(1), map);
        assert!(matches!(result, Err(CodecError::InvalidTimestamp { .. })));
    }

    #[test]
    fn reference_is_not_reconstructed() {
        let record = Record::new().with("invitor", Record::with_id(RecordId::new(2)));
        let map = encode_record(&user_types(), &record);
        let decoded = decode_record(&user_types(), RecordId::new(1), map).unwrap();
        assert!(decoded.get("invitor").is_none());
    }

    proptest! {
        #[test]
        fn numeric_and_timestamp_roundtrip(
            age in -1.0e12f64..1.0e12,
            millis in -62_135_596_800_000i64..253_402_300_799_000,
        ) {
            let ts = Utc.timestamp_millis_opt(millis).unwrap();
            let record = Record::with_id(RecordId::new(1))
                .with("age", age)
                .with("create_at", ts);

            let decoded = decode_record(
                &user_types(),
                RecordId::new(1),
                encode_record(&user_types(), &record),
            )
            .unwrap();

            prop_assert_eq!(decoded.number("age"), Some(age));
            prop_assert_eq!(decoded.create_at(), Some(ts));
        }
    }
}
