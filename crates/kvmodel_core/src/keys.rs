//! Key layout.
//!
//! ```text
//! _meta:<model>                 id counter
//! <model>:<id>                  primary record (hash)
//! <model>+<field>               ordered index (zset, member = id)
//! <model>#<field>:<value>       unique lookup (string, value = id)
//! <model>|<field>:<foreign-id>  many-to-one pointer (zset, member = id)
//! ```

use kvmodel_codec::RecordId;

/// Key of a model's id counter.
#[must_use]
pub fn counter_key(prefix: &str, model: &str) -> String {
    format!("{prefix}{model}")
}

/// Key of a primary record.
#[must_use]
pub fn record_key(model: &str, id: RecordId) -> String {
    format!("{model}:{id}")
}

/// Key of an ordered index.
#[must_use]
pub fn index_key(model: &str, field: &str) -> String {
    format!("{model}+{field}")
}

/// Key of a unique lookup entry.
#[must_use]
pub fn unique_key(model: &str, field: &str, value: &str) -> String {
    format!("{model}#{field}:{value}")
}

/// Key of the set of records pointing at `foreign` through `field`.
#[must_use]
pub fn relation_key(model: &str, field: &str, foreign: RecordId) -> String {
    format!("{model}|{field}:{foreign}")
}
