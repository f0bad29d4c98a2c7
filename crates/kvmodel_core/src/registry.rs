//! The model registry.

use crate::collection::{Entity, TypedModel};
use crate::config::Config;
use crate::entity::{CounterIdAllocator, EntityStore, HashEntityStore, IdAllocator};
use crate::error::{CoreError, CoreResult};
use crate::model::Model;
use crate::schema::ModelSchema;
use kvmodel_storage::KeyValueStore;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Declared models and the collaborators they are stored through.
///
/// A registry is assembled once at startup with [`ModelRegistry::builder`]
/// and is immutable afterwards. It can be shared freely between tasks.
///
/// # Example
///
/// ```rust
/// use kvmodel_core::{ModelRegistry, ModelSchema, Record};
/// use kvmodel_storage::InMemoryStore;
/// use std::sync::Arc;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let registry = ModelRegistry::builder(Arc::new(InMemoryStore::new()))
///     .model(ModelSchema::new("user").index("create_at").unique("email"))
///     .build()?;
///
/// let users = registry.model("user")?;
/// let user = users.insert(Record::new().with("email", "a@x.com")).await?;
/// assert_eq!(user.id().map(|id| id.as_u64()), Some(1));
/// # Ok::<(), kvmodel_core::CoreError>(())
/// # }).unwrap();
/// ```
pub struct ModelRegistry {
    models: HashMap<String, ModelSchema>,
    store: Arc<dyn KeyValueStore>,
    ids: Arc<dyn IdAllocator>,
    entities: Arc<dyn EntityStore>,
    config: Config,
}

impl ModelRegistry {
    /// Starts building a registry over `store`.
    pub fn builder(store: Arc<dyn KeyValueStore>) -> RegistryBuilder {
        RegistryBuilder {
            store,
            config: Config::default(),
            ids: None,
            entities: None,
            models: Vec::new(),
        }
    }

    /// Returns the handle of model `name`.
    ///
    /// # Errors
    ///
    /// Returns `ModelNotFound` if no such model is registered.
    pub fn model(&self, name: &str) -> CoreResult<Model<'_>> {
        Ok(Model::new(self, self.schema(name)?))
    }

    /// Returns the typed handle of `T`'s model.
    ///
    /// # Errors
    ///
    /// Returns `ModelNotFound` if `T::MODEL` is not registered.
    pub fn typed<T: Entity>(&self) -> CoreResult<TypedModel<'_, T>> {
        Ok(TypedModel::new(self.model(T::MODEL)?))
    }

    /// Returns the schema of model `name`.
    ///
    /// # Errors
    ///
    /// Returns `ModelNotFound` if no such model is registered.
    pub fn schema(&self, name: &str) -> CoreResult<&ModelSchema> {
        self.models.get(name).ok_or_else(|| CoreError::ModelNotFound {
            name: name.to_string(),
        })
    }

    /// Returns true if model `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Registered model names, sorted.
    #[must_use]
    pub fn model_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.models.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the key-value store secondary structures are kept in.
    #[must_use]
    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub(crate) fn ids(&self) -> &dyn IdAllocator {
        self.ids.as_ref()
    }

    pub(crate) fn entities(&self) -> &dyn EntityStore {
        self.entities.as_ref()
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("models", &self.model_names())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ModelRegistry`].
pub struct RegistryBuilder {
    store: Arc<dyn KeyValueStore>,
    config: Config,
    ids: Option<Arc<dyn IdAllocator>>,
    entities: Option<Arc<dyn EntityStore>>,
    models: Vec<ModelSchema>,
}

impl RegistryBuilder {
    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Replaces the default counter-based id allocator.
    #[must_use]
    pub fn id_allocator(mut self, ids: Arc<dyn IdAllocator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Replaces the default hash-per-record entity store.
    #[must_use]
    pub fn entity_store(mut self, entities: Arc<dyn EntityStore>) -> Self {
        self.entities = Some(entities);
        self
    }

    /// Registers a model.
    #[must_use]
    pub fn model(mut self, schema: ModelSchema) -> Self {
        self.models.push(schema);
        self
    }

    /// Validates every declaration and builds the registry.
    ///
    /// # Errors
    ///
    /// Returns a `Schema` error if a model name is registered twice or a
    /// declaration is invalid.
    pub fn build(self) -> CoreResult<ModelRegistry> {
        let names: HashSet<&str> = self.models.iter().map(ModelSchema::name).collect();
        if names.len() != self.models.len() {
            let mut seen = HashSet::new();
            let duplicate = self
                .models
                .iter()
                .map(ModelSchema::name)
                .find(|name| !seen.insert(*name))
                .unwrap_or_default();
            return Err(CoreError::schema(format!("model {duplicate} registered twice")));
        }
        for schema in &self.models {
            schema.validate(&names)?;
        }

        let ids = self.ids.unwrap_or_else(|| {
            Arc::new(CounterIdAllocator::new(
                Arc::clone(&self.store),
                self.config.counter_prefix.clone(),
            ))
        });
        let entities = self
            .entities
            .unwrap_or_else(|| Arc::new(HashEntityStore::new(Arc::clone(&self.store))));

        let models: HashMap<String, ModelSchema> = self
            .models
            .into_iter()
            .map(|schema| (schema.name().to_string(), schema))
            .collect();
        debug!(models = models.len(), "model registry built");

        Ok(ModelRegistry {
            models,
            store: self.store,
            ids,
            entities,
            config: self.config,
        })
    }
}

impl std::fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("models", &self.models)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
