//! Score-sorted index maintenance.

use crate::error::{CoreError, CoreResult};
use crate::index::query::ListQuery;
use crate::keys;
use crate::schema::{IndexKind, ModelSchema};
use kvmodel_codec::{Record, RecordId, Value};
use kvmodel_storage::{KeyValueStore, ScoreRange, WriteBatch};
use tracing::{trace, warn};

/// Maintains and queries a model's score-sorted sets.
///
/// An ordered index on `field` is one set at `<model>+<field>`, scored by
/// the field's value. A many-to-one relation on `field` is one set per
/// referenced record at `<model>|<field>:<foreign-id>`, scored by the time
/// the link was written.
pub struct IndexMaintainer<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> IndexMaintainer<'a> {
    /// Creates a maintainer over `store`.
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Queues the index entries of record `id` into `batch`.
    ///
    /// Re-staging a record moves it to its new score. Relation entries are
    /// only written when the record holds the foreign id.
    pub fn stage(
        &self,
        schema: &ModelSchema,
        id: RecordId,
        record: &Record,
        now_millis: f64,
        batch: &mut WriteBatch,
    ) {
        let member = id.to_string();
        for index in schema.indices() {
            match index.kind {
                IndexKind::Ordered => {
                    let score = record.get(&index.field).map_or(0.0, Value::score);
                    let key = keys::index_key(schema.name(), &index.field);
                    trace!(%key, score, %id, "stage index entry");
                    batch.zadd(key, score, member.clone());
                }
                IndexKind::Relation => {
                    if let Some(foreign) = record.reference_id(&index.field) {
                        let key = keys::relation_key(schema.name(), &index.field, foreign);
                        trace!(%key, %id, "stage relation pointer");
                        batch.zadd(key, now_millis, member.clone());
                    }
                }
            }
        }
    }

    /// Lists the ids in the sorted set at `key`.
    ///
    /// # Errors
    ///
    /// Returns the store's error, or a codec error if a member is not an id.
    pub async fn list(&self, key: &str, query: &ListQuery) -> CoreResult<Vec<RecordId>> {
        let reverse = query.order.is_reverse();
        let members = if query.is_ranged() {
            let range = ScoreRange::from_bounds(query.min, query.max);
            self.store
                .zrange_by_score(key, range, query.offset, query.limit, reverse)
                .await?
        } else {
            let stop = query.offset.saturating_add(query.limit);
            self.store.zrange(key, query.offset, stop, reverse).await?
        };

        members
            .iter()
            .map(|member| {
                member.parse::<RecordId>().map_err(|e| {
                    warn!(%key, %member, "index member is not a record id");
                    CoreError::from(e)
                })
            })
            .collect()
    }
}
