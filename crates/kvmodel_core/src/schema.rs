//! Model declarations.
//!
//! A [`ModelSchema`] is a declarative description of one entity type: its
//! typed fields, ordered indices, unique fields, relations and blob fields.
//! Declarations are collected with builder calls and frozen when the schema
//! is handed to a [`crate::ModelRegistry`].

use crate::blob::BlobStore;
use crate::error::{CoreError, CoreResult};
use kvmodel_codec::{FieldType, FieldTypes, CREATE_AT, UPDATE_AT};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Kind of a score-sorted index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// One set per field, scored by the field's value.
    Ordered,
    /// One set per referenced record, scored by link time.
    Relation,
}

/// A declared index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDescriptor {
    /// Index kind.
    pub kind: IndexKind,
    /// Indexed field.
    pub field: String,
    /// Target model of a relation index.
    pub target: Option<String>,
}

/// Schema of one model.
///
/// # Example
///
/// ```rust
/// use kvmodel_core::{FieldType, ModelSchema};
///
/// let post = ModelSchema::new("post")
///     .field("votes", FieldType::Numeric)
///     .index("votes")
///     .many_to_one("author", Some("user"))
///     .unique("slug");
///
/// assert!(post.ordered_index("votes").is_some());
/// assert_eq!(post.references()[0].1, "user");
/// ```
#[derive(Clone)]
pub struct ModelSchema {
    name: String,
    types: FieldTypes,
    /// Reference fields and their target models, in declaration order.
    references: Vec<(String, String)>,
    indices: Vec<IndexDescriptor>,
    uniques: Vec<String>,
    many_to_many: Vec<(String, String)>,
    blobs: Vec<(String, Arc<dyn BlobStore>)>,
    /// Problems found while declaring, reported when the registry is built.
    invalid: Vec<String>,
}

impl ModelSchema {
    /// Starts a schema. `create_at` and `update_at` are declared as timestamps.
    pub fn new(name: impl Into<String>) -> Self {
        let mut types = FieldTypes::new();
        types.insert(CREATE_AT.to_string(), FieldType::Timestamp);
        types.insert(UPDATE_AT.to_string(), FieldType::Timestamp);
        Self {
            name: name.into(),
            types,
            references: Vec::new(),
            indices: Vec::new(),
            uniques: Vec::new(),
            many_to_many: Vec::new(),
            blobs: Vec::new(),
            invalid: Vec::new(),
        }
    }

    /// Declares the type of a field. A later declaration replaces an earlier one.
    #[must_use]
    pub fn field(mut self, field: impl Into<String>, ty: FieldType) -> Self {
        let field = field.into();
        self.references.retain(|(name, _)| *name != field);
        if let FieldType::Reference(target) = &ty {
            self.references.push((field.clone(), target.clone()));
        }
        self.types.insert(field, ty);
        self
    }

    /// Declares a reference to a record of `target`, stored as `<field>_id`.
    #[must_use]
    pub fn reference(self, field: impl Into<String>, target: impl Into<String>) -> Self {
        self.field(field, FieldType::Reference(target.into()))
    }

    /// Declares an ordered index on a field.
    #[must_use]
    pub fn index(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        if self.ordered_index(&field).is_none() {
            self.indices.push(IndexDescriptor {
                kind: IndexKind::Ordered,
                field,
                target: None,
            });
        }
        self
    }

    /// Declares a unique field.
    #[must_use]
    pub fn unique(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        if !self.uniques.contains(&field) {
            self.uniques.push(field);
        }
        self
    }

    /// Declares a many-to-one relation.
    ///
    /// With a target the field is declared as a reference to it; without one
    /// the field must already be declared as a reference.
    #[must_use]
    pub fn many_to_one(mut self, field: impl Into<String>, target: Option<&str>) -> Self {
        let field = field.into();
        if let Some(target) = target {
            self = self.reference(field.clone(), target);
        }
        let target = self
            .types
            .get(&field)
            .and_then(FieldType::target)
            .map(str::to_string);
        match target {
            Some(target) => {
                if self.relation_index(&field).is_none() {
                    self.indices.push(IndexDescriptor {
                        kind: IndexKind::Relation,
                        field,
                        target: Some(target),
                    });
                }
            }
            None => self
                .invalid
                .push(format!("many_to_one {field} requires a reference type")),
        }
        self
    }

    /// Declares a many-to-many relation between two reference fields.
    ///
    /// The relation is recorded and validated, but not maintained or queryable.
    #[must_use]
    pub fn many_to_many(mut self, field1: impl Into<String>, field2: impl Into<String>) -> Self {
        self.many_to_many.push((field1.into(), field2.into()));
        self
    }

    /// Declares a blob field whose content lives in `store`.
    #[must_use]
    pub fn blob(mut self, field: impl Into<String>, store: Arc<dyn BlobStore>) -> Self {
        let field = field.into();
        self = self.field(field.clone(), FieldType::Opaque);
        self.blobs.retain(|(name, _)| *name != field);
        self.blobs.push((field, store));
        self
    }

    /// Model name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared field types.
    #[must_use]
    pub fn field_types(&self) -> &FieldTypes {
        &self.types
    }

    /// Declared type of one field.
    #[must_use]
    pub fn field_type(&self, field: &str) -> Option<&FieldType> {
        self.types.get(field)
    }

    /// Reference fields and their targets, in declaration order.
    #[must_use]
    pub fn references(&self) -> &[(String, String)] {
        &self.references
    }

    /// All declared indices.
    #[must_use]
    pub fn indices(&self) -> &[IndexDescriptor] {
        &self.indices
    }

    /// The ordered index on `field`.
    #[must_use]
    pub fn ordered_index(&self, field: &str) -> Option<&IndexDescriptor> {
        self.find_index(IndexKind::Ordered, field)
    }

    /// The many-to-one relation index on `field`.
    #[must_use]
    pub fn relation_index(&self, field: &str) -> Option<&IndexDescriptor> {
        self.find_index(IndexKind::Relation, field)
    }

    /// Unique fields.
    #[must_use]
    pub fn uniques(&self) -> &[String] {
        &self.uniques
    }

    /// Returns true if `field` is declared unique.
    #[must_use]
    pub fn is_unique(&self, field: &str) -> bool {
        self.uniques.iter().any(|f| f == field)
    }

    /// Declared many-to-many field pairs.
    #[must_use]
    pub fn many_to_many_pairs(&self) -> &[(String, String)] {
        &self.many_to_many
    }

    /// Blob fields and their stores.
    #[must_use]
    pub fn blobs(&self) -> &[(String, Arc<dyn BlobStore>)] {
        &self.blobs
    }

    /// The blob store of `field`.
    #[must_use]
    pub fn blob_store(&self, field: &str) -> Option<&Arc<dyn BlobStore>> {
        self.blobs
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, store)| store)
    }

    fn find_index(&self, kind: IndexKind, field: &str) -> Option<&IndexDescriptor> {
        self.indices
            .iter()
            .find(|index| index.kind == kind && index.field == field)
    }

    /// Checks the declarations against the set of registered model names.
    pub(crate) fn validate(&self, models: &HashSet<&str>) -> CoreResult<()> {
        if let Some(problem) = self.invalid.first() {
            return Err(CoreError::schema(format!("{}: {problem}", self.name)));
        }
        for (field1, field2) in &self.many_to_many {
            for field in [field1, field2] {
                match self.types.get(field).and_then(FieldType::target) {
                    Some(target) if models.contains(target) => {}
                    _ => {
                        return Err(CoreError::schema(format!(
                            "{}: many_to_many {field1},{field2} requires {field} to reference a registered model",
                            self.name
                        )))
                    }
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ModelSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let blobs: Vec<&str> = self.blobs.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("ModelSchema")
            .field("name", &self.name)
            .field("types", &self.types)
            .field("indices", &self.indices)
            .field("uniques", &self.uniques)
            .field("many_to_many", &self.many_to_many)
            .field("blobs", &blobs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::MemoryBlobStore;

    #[test]
    fn implicit_timestamps() {
        let schema = ModelSchema::new("user");
        assert_eq!(schema.field_type("create_at"), Some(&FieldType::Timestamp));
        assert_eq!(schema.field_type("update_at"), Some(&FieldType::Timestamp));
    }

    #[test]
    fn references_keep_declaration_order() {
        let schema = ModelSchema::new("comment")
            .reference("post", "post")
            .reference("author", "user");
        let fields: Vec<&str> = schema.references().iter().map(|(f, _)| f.as_str()).collect();
        assert_eq!(fields, vec!["post", "author"]);
    }

    #[test]
    fn redeclaring_a_reference_replaces_it() {
        let schema = ModelSchema::new("user")
            .reference("invitor", "admin")
            .reference("invitor", "user");
        assert_eq!(schema.references(), &[("invitor".to_string(), "user".to_string())]);

        let schema = schema.field("invitor", FieldType::Numeric);
        assert!(schema.references().is_empty());
    }

    #[test]
    fn indices_are_not_duplicated() {
        let schema = ModelSchema::new("user")
            .index("create_at")
            .index("create_at")
            .unique("email")
            .unique("email");
        assert_eq!(schema.indices().len(), 1);
        assert_eq!(schema.uniques(), &["email".to_string()]);
        assert!(schema.is_unique("email"));
    }

    #[test]
    fn many_to_one_declares_reference() {
        let schema = ModelSchema::new("post").many_to_one("author", Some("user"));
        let index = schema.relation_index("author").unwrap();
        assert_eq!(index.kind, IndexKind::Relation);
        assert_eq!(index.target.as_deref(), Some("user"));
        assert_eq!(schema.field_type("author"), Some(&FieldType::reference("user")));
    }

    #[test]
    fn many_to_one_without_type_is_invalid() {
        let schema = ModelSchema::new("post").many_to_one("author", None);
        let models: HashSet<&str> = ["post"].into_iter().collect();
        assert!(matches!(schema.validate(&models), Err(CoreError::Schema { .. })));
    }

    #[test]
    fn many_to_many_requires_registered_targets() {
        let schema = ModelSchema::new("comment")
            .reference("post", "post")
            .reference("user", "user")
            .many_to_many("post", "user");

        let partial: HashSet<&str> = ["comment", "post"].into_iter().collect();
        assert!(schema.validate(&partial).is_err());

        let all: HashSet<&str> = ["comment", "post", "user"].into_iter().collect();
        assert!(schema.validate(&all).is_ok());
    }

    #[test]
    fn blob_fields_are_opaque() {
        let schema = ModelSchema::new("post").blob("body", Arc::new(MemoryBlobStore::new()));
        assert_eq!(schema.field_type("body"), Some(&FieldType::Opaque));
        assert!(schema.blob_store("body").is_some());
        assert!(schema.blob_store("title").is_none());
    }
}
