//! Reference field expansion.

use crate::error::CoreResult;
use crate::registry::ModelRegistry;
use crate::schema::ModelSchema;
use futures::future::join_all;
use kvmodel_codec::{Record, RecordId, Value};
use tracing::trace;

/// Expands reference fields into the records they point at.
///
/// Targets are looked up by name in the registry when a record is
/// expanded, so models may reference each other in any declaration order.
/// An unresolvable reference becomes [`Value::Null`]; it is never an error.
pub struct RelationResolver<'r> {
    registry: &'r ModelRegistry,
}

impl<'r> RelationResolver<'r> {
    /// Creates a resolver over `registry`.
    pub fn new(registry: &'r ModelRegistry) -> Self {
        Self { registry }
    }

    /// Fetches the decoded record `id` of model `target`.
    ///
    /// Returns [`Value::Null`] when there is no id, the target model is not
    /// registered, or the record does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the target's store read or decode fails.
    pub async fn resolve(&self, target: &str, id: Option<RecordId>) -> CoreResult<Value> {
        let Some(id) = id else {
            return Ok(Value::Null);
        };
        let Ok(model) = self.registry.model(target) else {
            trace!(target, %id, "reference target not registered");
            return Ok(Value::Null);
        };
        Ok(model
            .get_opt(id)
            .await?
            .map_or(Value::Null, |record| Value::Record(Box::new(record))))
    }

    /// Replaces every reference field of `record` with its resolved target.
    ///
    /// One fetch is issued per reference field and all of them complete
    /// before this returns. The backing `<field>_id` values are kept.
    ///
    /// # Errors
    ///
    /// Returns the first fetch error in declaration order.
    pub async fn expand(&self, schema: &ModelSchema, mut record: Record) -> CoreResult<Record> {
        let references = schema.references();
        let fetches = references
            .iter()
            .map(|(field, target)| self.resolve(target, record.reference_id(field)));
        let resolved = join_all(fetches).await;

        for ((field, _), value) in references.iter().zip(resolved) {
            record.set(field.clone(), value?);
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvmodel_storage::InMemoryStore;
    use std::sync::Arc;

    fn registry() -> ModelRegistry {
        ModelRegistry::builder(Arc::new(InMemoryStore::new()))
            .model(ModelSchema::new("user").reference("invitor", "user"))
            .model(
                ModelSchema::new("post")
                    .many_to_one("author", Some("user"))
                    .reference("editor", "staff"),
            )
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn missing_id_resolves_to_null() {
        let registry = registry();
        let resolver = RelationResolver::new(&registry);
        assert_eq!(resolver.resolve("user", None).await.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn unregistered_target_resolves_to_null() {
        let registry = registry();
        let resolver = RelationResolver::new(&registry);
        let value = resolver.resolve("staff", Some(RecordId::new(1))).await.unwrap();
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn expand_fills_every_reference() {
        let registry = registry();
        let users = registry.model("user").unwrap();
        let author = users.insert(Record::new().with("username", "a")).await.unwrap();
        let author_id = author.id().unwrap();

        let post = Record::new()
            .with("author_id", author_id)
            .with("editor_id", 9);
        let schema = registry.schema("post").unwrap();
        let expanded = RelationResolver::new(&registry)
            .expand(schema, post)
            .await
            .unwrap();

        let nested = expanded.nested("author").unwrap();
        assert_eq!(nested.id(), Some(author_id));
        assert_eq!(nested.text("username"), Some("a"));
        assert_eq!(expanded.get("editor"), Some(&Value::Null));
        assert_eq!(expanded.reference_id("author"), Some(author_id));
    }

    #[tokio::test]
    async fn dangling_reference_resolves_to_null() {
        let registry = registry();
        let schema = registry.schema("user").unwrap();
        let record = Record::new().with("invitor_id", 42);

        let expanded = RelationResolver::new(&registry)
            .expand(schema, record)
            .await
            .unwrap();
        assert_eq!(expanded.get("invitor"), Some(&Value::Null));
    }
}
