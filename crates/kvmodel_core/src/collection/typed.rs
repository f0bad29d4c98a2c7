//! Typed model handle.

use crate::collection::codec::Entity;
use crate::error::CoreResult;
use crate::index::ListQuery;
use crate::model::Model;
use kvmodel_codec::{RecordId, Value};
use std::marker::PhantomData;

/// A model whose records convert to and from `T`.
///
/// `TypedModel<T>` wraps a [`Model`] and converts through [`Entity`] on the
/// way in and out. Obtain one with [`crate::ModelRegistry::typed`].
///
/// # Example
///
/// ```rust,ignore
/// let users = registry.typed::<User>()?;
///
/// let alice = users.save(User { id: None, email: "a@x.com".into() }).await?;
/// let found = users.get_by_unique("email", "a@x.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(alice.id));
/// ```
pub struct TypedModel<'r, T: Entity> {
    model: Model<'r>,
    _marker: PhantomData<fn() -> T>,
}

impl<'r, T: Entity> TypedModel<'r, T> {
    pub(crate) fn new(model: Model<'r>) -> Self {
        Self {
            model,
            _marker: PhantomData,
        }
    }

    /// The untyped handle.
    #[must_use]
    pub fn model(&self) -> Model<'r> {
        self.model
    }

    /// Inserts or updates `entity` and returns it as stored.
    ///
    /// # Errors
    ///
    /// See [`Model::save`].
    pub async fn save(&self, entity: &T) -> CoreResult<T> {
        let record = self.model.save(entity.to_record()).await?;
        T::from_record(record)
    }

    /// Reads entity `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it does not exist.
    pub async fn get(&self, id: RecordId) -> CoreResult<T> {
        T::from_record(self.model.get(id).await?)
    }

    /// Reads entity `id`, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the read or conversion fails.
    pub async fn get_opt(&self, id: RecordId) -> CoreResult<Option<T>> {
        self.model.get_opt(id).await?.map(T::from_record).transpose()
    }

    /// Lists entities through the ordered index on `field`.
    ///
    /// # Errors
    ///
    /// Returns `Precondition` if `field` has no ordered index.
    pub async fn list(&self, field: &str, query: &ListQuery) -> CoreResult<Vec<T>> {
        self.model
            .list(field, query)
            .await?
            .into_iter()
            .map(T::from_record)
            .collect()
    }

    /// Reads the entity holding `value` in the unique field `field`.
    ///
    /// # Errors
    ///
    /// Returns `Precondition` if `field` is not unique.
    pub async fn get_by_unique(&self, field: &str, value: impl Into<Value>) -> CoreResult<Option<T>> {
        self.model
            .get_by_unique(field, value)
            .await?
            .map(T::from_record)
            .transpose()
    }
}

impl<T: Entity> std::fmt::Debug for TypedModel<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedModel")
            .field("model", &self.model.name())
            .finish()
    }
}
