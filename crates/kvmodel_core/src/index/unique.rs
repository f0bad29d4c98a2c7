//! Unique value lookups.

use crate::error::CoreResult;
use crate::keys;
use crate::schema::ModelSchema;
use kvmodel_codec::{Record, RecordId, Value};
use kvmodel_storage::{KeyValueStore, WriteBatch};
use tracing::trace;

/// Maintains value-to-id entries for unique fields.
///
/// Entries are last-write-wins: writing a value that already maps to
/// another record silently takes the entry over. Nothing checks for
/// conflicts, and the entry for a value a record no longer holds is left in
/// place, so a lookup by an old value still finds the record.
pub struct UniqueConstraintMaintainer<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> UniqueConstraintMaintainer<'a> {
    /// Creates a maintainer over `store`.
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Queues the unique entries of record `id` into `batch`.
    ///
    /// Fields without a value get no entry.
    pub fn stage(&self, schema: &ModelSchema, id: RecordId, record: &Record, batch: &mut WriteBatch) {
        for field in schema.uniques() {
            let Some(value) = record.get(field).and_then(Value::to_field_string) else {
                continue;
            };
            let key = keys::unique_key(schema.name(), field, &value);
            trace!(%key, %id, "stage unique entry");
            batch.set(key, id.to_string());
        }
    }

    /// Looks up the record holding `value` in a unique field.
    ///
    /// # Errors
    ///
    /// Returns the store's error, or a codec error if the entry is not an id.
    pub async fn lookup(&self, model: &str, field: &str, value: &Value) -> CoreResult<Option<RecordId>> {
        let Some(value) = value.to_field_string() else {
            return Ok(None);
        };
        match self.store.get(&keys::unique_key(model, field, &value)).await? {
            Some(id) => Ok(Some(id.parse()?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvmodel_storage::InMemoryStore;

    fn user_schema() -> ModelSchema {
        ModelSchema::new("user").unique("email").unique("username")
    }

    #[tokio::test]
    async fn staged_entries_resolve() {
        let store = InMemoryStore::new();
        let uniques = UniqueConstraintMaintainer::new(&store);
        let record = Record::new().with("email", "a@x.com").with("username", "a");

        let mut batch = WriteBatch::new();
        uniques.stage(&user_schema(), RecordId::new(1), &record, &mut batch);
        store.exec(batch).await.unwrap();

        let found = uniques
            .lookup("user", "email", &Value::from("a@x.com"))
            .await
            .unwrap();
        assert_eq!(found, Some(RecordId::new(1)));
        let missing = uniques
            .lookup("user", "email", &Value::from("b@x.com"))
            .await
            .unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn absent_values_are_skipped() {
        let store = InMemoryStore::new();
        let uniques = UniqueConstraintMaintainer::new(&store);
        let record = Record::new().with("email", Value::Null);

        let mut batch = WriteBatch::new();
        uniques.stage(&user_schema(), RecordId::new(1), &record, &mut batch);
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn last_write_wins() {
        let store = InMemoryStore::new();
        let uniques = UniqueConstraintMaintainer::new(&store);
        let record = Record::new().with("email", "dup@x.com");

        let mut batch = WriteBatch::new();
        uniques.stage(&user_schema(), RecordId::new(1), &record, &mut batch);
        uniques.stage(&user_schema(), RecordId::new(2), &record, &mut batch);
        store.exec(batch).await.unwrap();

        let found = uniques
            .lookup("user", "email", &Value::from("dup@x.com"))
            .await
            .unwrap();
        assert_eq!(found, Some(RecordId::new(2)));
    }

    #[tokio::test]
    async fn null_lookup_finds_nothing() {
        let store = InMemoryStore::new();
        let uniques = UniqueConstraintMaintainer::new(&store);
        assert_eq!(uniques.lookup("user", "email", &Value::Null).await.unwrap(), None);
    }
}
