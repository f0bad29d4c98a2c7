//! # kvmodel Codec
//!
//! Typed values and records, and their flat encoding for kvmodel.
//!
//! A key-value store keeps a record as a hash of strings. This crate
//! converts between that flat form and typed [`Record`]s, driven by the
//! field types a model declares:
//!
//! - Numeric fields round-trip exactly
//! - Timestamp fields round-trip at millisecond precision
//! - Reference and opaque fields are never stored inline
//!
//! ## Usage
//!
//! ```
//! use kvmodel_codec::{decode_record, encode_record, FieldType, FieldTypes, Record, RecordId};
//!
//! let mut types = FieldTypes::new();
//! types.insert("age".to_string(), FieldType::Numeric);
//!
//! let record = Record::new().with("name", "alice").with("age", 30);
//! let map = encode_record(&types, &record);
//! assert_eq!(map["age"], "30");
//!
//! let decoded = decode_record(&types, RecordId::new(1), map).unwrap();
//! assert_eq!(decoded.number("age"), Some(30.0));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod codec;
mod error;
mod record;
mod value;

pub use codec::{decode_record, encode_record, FieldMap, FieldType, FieldTypes};
pub use error::{CodecError, CodecResult};
pub use record::{reference_id_field, Record, CREATE_AT, UPDATE_AT};
pub use value::{format_timestamp, RecordId, Value};
