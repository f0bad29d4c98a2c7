//! Per-model CRUD handle.

use crate::blob::BlobStore;
use crate::error::{CoreError, CoreResult};
use crate::index::{IndexMaintainer, ListQuery, UniqueConstraintMaintainer};
use crate::keys;
use crate::registry::ModelRegistry;
use crate::relation::RelationResolver;
use crate::schema::ModelSchema;
use chrono::{DateTime, SubsecRound, Utc};
use futures::future::join_all;
use kvmodel_codec::{decode_record, encode_record, Record, RecordId, Value, CREATE_AT, UPDATE_AT};
use kvmodel_storage::WriteBatch;
use tracing::{debug, error, trace, warn};

/// Operations on the records of one model.
///
/// A `Model` borrows its registry and is cheap to copy. Obtain one with
/// [`ModelRegistry::model`].
///
/// Writes are not transactional. A write stores the primary record and
/// queues every index, unique and relation entry into one batch; the two
/// are issued together, and a batch failure after the primary record is
/// stored is reported as [`CoreError::SecondaryWrite`] without rollback.
/// Blob fields are written once the primary record is stored, before any
/// batch failure is reported.
/// Removing a record leaves its index and unique entries in place.
#[derive(Clone, Copy)]
pub struct Model<'r> {
    registry: &'r ModelRegistry,
    schema: &'r ModelSchema,
}

impl<'r> Model<'r> {
    pub(crate) fn new(registry: &'r ModelRegistry, schema: &'r ModelSchema) -> Self {
        Self { registry, schema }
    }

    /// Model name.
    #[must_use]
    pub fn name(&self) -> &'r str {
        self.schema.name()
    }

    /// Model schema.
    #[must_use]
    pub fn schema(&self) -> &'r ModelSchema {
        self.schema
    }

    /// Inserts `record` if it has no id, updates it otherwise.
    ///
    /// # Errors
    ///
    /// See [`Model::insert`] and [`Model::update`].
    pub async fn save(&self, record: Record) -> CoreResult<Record> {
        if record.id().is_some() {
            self.update(record).await
        } else {
            self.insert(record).await
        }
    }

    /// Inserts a new record.
    ///
    /// Allocates an id, stamps `create_at` and persists the record. If the
    /// allocated id already holds a record, a fresh id is allocated, up to
    /// [`crate::Config::max_insert_attempts`] ids in total.
    ///
    /// Returns `record` with its id and `create_at` set.
    ///
    /// # Errors
    ///
    /// - `Precondition` if `record` already has an id
    /// - `AllocationCollisionExhausted` if every allocated id was taken
    /// - `Storage` or `SecondaryWrite` if persisting fails
    pub async fn insert(&self, mut record: Record) -> CoreResult<Record> {
        if let Some(id) = record.id() {
            return Err(CoreError::precondition(format!(
                "insert into {} given a record that already has id {id}",
                self.name()
            )));
        }

        let attempts = self.registry.config().max_insert_attempts;
        for attempt in 1..=attempts {
            let id = self.registry.ids().next_id(self.name()).await?;
            if self.registry.entities().exists(self.name(), id).await? {
                warn!(model = self.name(), %id, attempt, "allocated id already in use, retrying");
                continue;
            }

            let now = now();
            record.set_id(id);
            record.set(CREATE_AT, now);
            self.persist(id, &record, now).await?;
            debug!(model = self.name(), %id, "inserted record");
            return Ok(record);
        }

        Err(CoreError::AllocationCollisionExhausted {
            model: self.name().to_string(),
            attempts,
        })
    }

    /// Rewrites an existing record and all of its secondary entries.
    ///
    /// Stamps `update_at` with the current time, or keeps the value the
    /// record carries if that is later, so `update_at` never goes backwards.
    ///
    /// # Errors
    ///
    /// - `Precondition` if `record` has no id
    /// - `Storage` or `SecondaryWrite` if persisting fails
    pub async fn update(&self, mut record: Record) -> CoreResult<Record> {
        let Some(id) = record.id() else {
            return Err(CoreError::precondition(format!(
                "update of {} requires a record id",
                self.name()
            )));
        };

        let now = now();
        let stamp = match record.update_at() {
            Some(previous) if previous > now => previous,
            _ => now,
        };
        record.set(UPDATE_AT, stamp);
        self.persist(id, &record, now).await?;
        debug!(model = self.name(), %id, "updated record");
        Ok(record)
    }

    async fn persist(&self, id: RecordId, record: &Record, now: DateTime<Utc>) -> CoreResult<()> {
        let store = self.registry.store();
        let mut batch = WriteBatch::new();
        IndexMaintainer::new(store).stage(
            self.schema,
            id,
            record,
            now.timestamp_millis() as f64,
            &mut batch,
        );
        UniqueConstraintMaintainer::new(store).stage(self.schema, id, record, &mut batch);
        trace!(model = self.name(), %id, ops = batch.len(), "persisting record");

        let fields = encode_record(self.schema.field_types(), record);
        let (secondary, primary) = futures::join!(
            store.exec(batch),
            self.registry.entities().set(self.name(), id, fields)
        );
        primary?;

        // Blobs follow a stored primary record even if the batch failed.
        for (field, blobs) in self.schema.blobs() {
            let Some(bytes) = record.get(field).and_then(Value::to_field_string) else {
                continue;
            };
            blobs
                .set(id, bytes.into_bytes())
                .await
                .map_err(|e| CoreError::blob(field.as_str(), e.to_string()))?;
        }

        secondary.map_err(|source| {
            error!(model = self.name(), %id, error = %source, "secondary structures not written");
            CoreError::SecondaryWrite {
                model: self.name().to_string(),
                id,
                source,
            }
        })
    }

    /// Reads and decodes record `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the record does not exist.
    pub async fn get(&self, id: RecordId) -> CoreResult<Record> {
        self.get_opt(id)
            .await?
            .ok_or_else(|| CoreError::not_found(self.name(), id))
    }

    /// Reads and decodes record `id`, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the read or decode fails.
    pub async fn get_opt(&self, id: RecordId) -> CoreResult<Option<Record>> {
        let Some(fields) = self.registry.entities().get(self.name(), id).await? else {
            debug!(model = self.name(), %id, "record not found");
            return Ok(None);
        };
        Ok(Some(decode_record(self.schema.field_types(), id, fields)?))
    }

    /// Reads record `id` with every reference field expanded.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the record does not exist.
    pub async fn get_full(&self, id: RecordId) -> CoreResult<Record> {
        self.get_full_opt(id)
            .await?
            .ok_or_else(|| CoreError::not_found(self.name(), id))
    }

    /// Reads record `id` with every reference field expanded, or `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if any read or decode fails.
    pub async fn get_full_opt(&self, id: RecordId) -> CoreResult<Option<Record>> {
        match self.get_opt(id).await? {
            Some(record) => Ok(Some(self.expand(record).await?)),
            None => Ok(None),
        }
    }

    /// Deletes the primary record `id`. Returns true if it existed.
    ///
    /// Index, unique and relation entries are not removed; listing skips
    /// ids whose record is gone.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub async fn remove(&self, id: RecordId) -> CoreResult<bool> {
        let removed = self.registry.entities().delete(self.name(), id).await?;
        debug!(model = self.name(), %id, removed, "removed record");
        Ok(removed)
    }

    /// Lists ids through the ordered index on `field`.
    ///
    /// # Errors
    ///
    /// Returns `Precondition` if `field` has no ordered index.
    pub async fn list_ids(&self, field: &str, query: &ListQuery) -> CoreResult<Vec<RecordId>> {
        if self.schema.ordered_index(field).is_none() {
            return Err(CoreError::precondition(format!(
                "{} has no ordered index on {field}",
                self.name()
            )));
        }
        let key = keys::index_key(self.name(), field);
        IndexMaintainer::new(self.registry.store())
            .list(&key, query)
            .await
    }

    /// Lists decoded records through the ordered index on `field`.
    ///
    /// # Errors
    ///
    /// Returns `Precondition` if `field` has no ordered index.
    pub async fn list(&self, field: &str, query: &ListQuery) -> CoreResult<Vec<Record>> {
        let ids = self.list_ids(field, query).await?;
        self.fetch_all(ids, false).await
    }

    /// Lists expanded records through the ordered index on `field`.
    ///
    /// # Errors
    ///
    /// Returns `Precondition` if `field` has no ordered index.
    pub async fn list_full(&self, field: &str, query: &ListQuery) -> CoreResult<Vec<Record>> {
        let ids = self.list_ids(field, query).await?;
        self.fetch_all(ids, true).await
    }

    /// Lists the ids of records whose `field` points at `foreign`.
    ///
    /// Records are ordered by when they were last written.
    ///
    /// # Errors
    ///
    /// Returns `Precondition` if `field` is not a many-to-one relation.
    pub async fn list_related_ids(
        &self,
        field: &str,
        foreign: RecordId,
        query: &ListQuery,
    ) -> CoreResult<Vec<RecordId>> {
        if self.schema.relation_index(field).is_none() {
            return Err(CoreError::precondition(format!(
                "{} has no many-to-one relation on {field}",
                self.name()
            )));
        }
        let key = keys::relation_key(self.name(), field, foreign);
        IndexMaintainer::new(self.registry.store())
            .list(&key, query)
            .await
    }

    /// Lists decoded records whose `field` points at `foreign`.
    ///
    /// # Errors
    ///
    /// Returns `Precondition` if `field` is not a many-to-one relation.
    pub async fn list_related(
        &self,
        field: &str,
        foreign: RecordId,
        query: &ListQuery,
    ) -> CoreResult<Vec<Record>> {
        let ids = self.list_related_ids(field, foreign, query).await?;
        self.fetch_all(ids, false).await
    }

    /// Lists expanded records whose `field` points at `foreign`.
    ///
    /// # Errors
    ///
    /// Returns `Precondition` if `field` is not a many-to-one relation.
    pub async fn list_related_full(
        &self,
        field: &str,
        foreign: RecordId,
        query: &ListQuery,
    ) -> CoreResult<Vec<Record>> {
        let ids = self.list_related_ids(field, foreign, query).await?;
        self.fetch_all(ids, true).await
    }

    async fn fetch_all(&self, ids: Vec<RecordId>, full: bool) -> CoreResult<Vec<Record>> {
        let fetches = ids.iter().map(|&id| async move {
            if full {
                self.get_full_opt(id).await
            } else {
                self.get_opt(id).await
            }
        });
        let mut records = Vec::with_capacity(ids.len());
        for (id, fetched) in ids.iter().zip(join_all(fetches).await) {
            match fetched? {
                Some(record) => records.push(record),
                None => trace!(model = self.name(), %id, "skipping indexed id without a record"),
            }
        }
        Ok(records)
    }

    /// Looks up the id holding `value` in the unique field `field`.
    ///
    /// # Errors
    ///
    /// Returns `Precondition` if `field` is not unique.
    pub async fn lookup_unique(
        &self,
        field: &str,
        value: impl Into<Value>,
    ) -> CoreResult<Option<RecordId>> {
        if !self.schema.is_unique(field) {
            return Err(CoreError::precondition(format!(
                "{}.{field} is not declared unique",
                self.name()
            )));
        }
        UniqueConstraintMaintainer::new(self.registry.store())
            .lookup(self.name(), field, &value.into())
            .await
    }

    /// Reads the record holding `value` in the unique field `field`.
    ///
    /// # Errors
    ///
    /// Returns `Precondition` if `field` is not unique.
    pub async fn get_by_unique(
        &self,
        field: &str,
        value: impl Into<Value>,
    ) -> CoreResult<Option<Record>> {
        match self.lookup_unique(field, value).await? {
            Some(id) => self.get_opt(id).await,
            None => Ok(None),
        }
    }

    /// Reads and expands the record holding `value` in the unique field `field`.
    ///
    /// # Errors
    ///
    /// Returns `Precondition` if `field` is not unique.
    pub async fn get_full_by_unique(
        &self,
        field: &str,
        value: impl Into<Value>,
    ) -> CoreResult<Option<Record>> {
        match self.lookup_unique(field, value).await? {
            Some(id) => self.get_full_opt(id).await,
            None => Ok(None),
        }
    }

    /// Resolves the reference field `field` of `record`.
    ///
    /// Returns [`Value::Null`] when the reference cannot be resolved.
    ///
    /// # Errors
    ///
    /// Returns `Precondition` if `field` is not a reference.
    pub async fn expand_relation(&self, record: &Record, field: &str) -> CoreResult<Value> {
        let Some(target) = self.schema.field_type(field).and_then(|ty| ty.target()) else {
            return Err(CoreError::precondition(format!(
                "{}.{field} is not a reference",
                self.name()
            )));
        };
        RelationResolver::new(self.registry)
            .resolve(target, record.reference_id(field))
            .await
    }

    async fn expand(&self, record: Record) -> CoreResult<Record> {
        RelationResolver::new(self.registry)
            .expand(self.schema, record)
            .await
    }

    /// Lists records through a many-to-many relation.
    ///
    /// Many-to-many relations can be declared but are not maintained.
    ///
    /// # Errors
    ///
    /// Returns `Precondition` if the pair is not declared, and
    /// `Unsupported` otherwise.
    pub async fn list_many_to_many(
        &self,
        field1: &str,
        field2: &str,
        _query: &ListQuery,
    ) -> CoreResult<Vec<RecordId>> {
        let declared = self
            .schema
            .many_to_many_pairs()
            .iter()
            .any(|(a, b)| (a == field1 && b == field2) || (a == field2 && b == field1));
        if !declared {
            return Err(CoreError::precondition(format!(
                "{} declares no many-to-many relation {field1},{field2}",
                self.name()
            )));
        }
        Err(CoreError::unsupported("many-to-many relation queries"))
    }

    /// Reads the blob `field` of record `id`.
    ///
    /// # Errors
    ///
    /// Returns `Precondition` if `field` is not a blob field, or `Blob` if
    /// its store fails.
    pub async fn load_blob(&self, id: RecordId, field: &str) -> CoreResult<Option<Vec<u8>>> {
        let blobs = self.blob_store(field)?;
        blobs
            .get(id)
            .await
            .map_err(|e| CoreError::blob(field, e.to_string()))
    }

    /// Deletes the blob `field` of record `id`. Returns true if it existed.
    ///
    /// # Errors
    ///
    /// Returns `Precondition` if `field` is not a blob field, or `Blob` if
    /// its store fails.
    pub async fn remove_blob(&self, id: RecordId, field: &str) -> CoreResult<bool> {
        let blobs = self.blob_store(field)?;
        blobs
            .del(id)
            .await
            .map_err(|e| CoreError::blob(field, e.to_string()))
    }

    fn blob_store(&self, field: &str) -> CoreResult<&'r dyn BlobStore> {
        self.schema
            .blob_store(field)
            .map(|store| store.as_ref())
            .ok_or_else(|| {
                CoreError::precondition(format!("{}.{field} is not a blob field", self.name()))
            })
    }
}

impl std::fmt::Debug for Model<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Current time at the precision timestamps are stored with.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
