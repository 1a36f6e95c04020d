//! Schema engine: creation, inheritance resolution and field validation

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, trace};
use tracker_common::Pretty;
use tracker_fields::{FieldDefinition, FieldsError};

use crate::cache::SchemaCache;
use crate::config::SchemaConfig;
use crate::error::{Result, SchemaError};
use crate::store::{SkippedFile, WorkItemTypeStore};
use crate::types::{
    Category, CategoryId, FieldValues, NewWorkItemType, Payload, ResolvedWorkItemType, Schema,
    WorkItemType, WorkItemTypeId,
};

/// Creates and evolves work item types and validates field values against
/// their flattened schemas.
///
/// Clones share the store, the schema cache and the write lock.
#[derive(Clone)]
pub struct SchemaEngine {
    store: Arc<dyn WorkItemTypeStore>,
    cache: SchemaCache,
    config: SchemaConfig,
    writes: Arc<Mutex<()>>,
}

impl fmt::Debug for SchemaEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SchemaEngine {
    pub fn new(store: Arc<dyn WorkItemTypeStore>, config: SchemaConfig) -> Self {
        Self {
            store,
            cache: SchemaCache::new(),
            config,
            writes: Arc::new(Mutex::new(())),
        }
    }

    /// Definition files the store could not load.
    pub fn skipped_files(&self) -> Vec<SkippedFile> {
        self.store.skipped_files()
    }

    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    /// Create a work item type.
    ///
    /// The name must not be blank, every field type must be well formed, and
    /// the base type and categories must exist. The returned schema contains
    /// the inherited fields followed by the new type's own.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(&self, request: NewWorkItemType) -> Result<ResolvedWorkItemType> {
        if request.name.trim().is_empty() {
            return Err(SchemaError::bad_parameter("name", "must not be blank"));
        }
        validate_definitions(&request.fields)?;

        let _guard = self.writes.lock().await;

        let mut schema = match &request.base_type_id {
            Some(base) => {
                let ancestors = self.load_chain(base).await?.len();
                if ancestors > self.config.max_inheritance_depth {
                    return Err(SchemaError::InheritanceTooDeep {
                        id: request.name,
                        max: self.config.max_inheritance_depth,
                    });
                }
                Schema::clone(&*self.resolve_schema(base).await?)
            }
            None => Schema::new(),
        };
        for category in &request.categories {
            self.store.load_category(category).await?;
        }

        let work_item_type = WorkItemType {
            id: WorkItemTypeId::new(),
            name: request.name,
            description: request.description,
            icon: request.icon,
            base_type_id: request.base_type_id,
            fields: request.fields,
        };
        self.store.save(&work_item_type).await?;
        if !request.categories.is_empty() {
            self.store
                .link_categories(&work_item_type.id, &request.categories)
                .await?;
        }

        for (name, definition) in &work_item_type.fields {
            schema.insert(name.clone(), definition.clone());
        }
        info!(
            id = %work_item_type.id,
            base = ?work_item_type.base_type_id,
            fields = schema.len(),
            "created work item type"
        );
        Ok(ResolvedWorkItemType {
            work_item_type,
            schema,
        })
    }

    /// Load a work item type as stored, own fields only.
    pub async fn load(&self, id: &WorkItemTypeId) -> Result<WorkItemType> {
        self.store.load(id).await
    }

    /// Load a work item type together with its flattened schema.
    pub async fn resolve(&self, id: &WorkItemTypeId) -> Result<ResolvedWorkItemType> {
        let schema = self.resolve_schema(id).await?;
        let work_item_type = self.store.load(id).await?;
        Ok(ResolvedWorkItemType {
            work_item_type,
            schema: Schema::clone(&schema),
        })
    }

    /// Flatten the inheritance chain of `id` into one schema.
    ///
    /// Ancestor fields come first; a field redefined lower in the chain takes
    /// the lower definition. Cycles and chains longer than
    /// `max_inheritance_depth` are configuration errors.
    pub async fn resolve_schema(&self, id: &WorkItemTypeId) -> Result<Arc<Schema>> {
        if self.config.cache_resolved {
            if let Some(schema) = self.cache.get(id).await {
                return Ok(schema);
            }
        }
        let generation = self.cache.generation().await;
        let chain = self.load_chain(id).await?;

        let mut schema = Schema::new();
        for work_item_type in chain.iter().rev() {
            for (name, definition) in &work_item_type.fields {
                schema.insert(name.clone(), definition.clone());
            }
        }
        let schema = Arc::new(schema);
        debug!(%id, depth = chain.len() - 1, fields = schema.len(), "resolved schema");
        trace!(%id, "flattened schema: {}", Pretty(&*schema));

        if self.config.cache_resolved {
            let lineage = chain.iter().map(|wit| wit.id).collect();
            self.cache
                .insert(generation, lineage, Arc::clone(&schema))
                .await;
        }
        Ok(schema)
    }

    /// The type itself followed by its ancestors, nearest first.
    async fn load_chain(&self, id: &WorkItemTypeId) -> Result<Vec<WorkItemType>> {
        let mut chain: Vec<WorkItemType> = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(*id);
        while let Some(current) = next {
            if !seen.insert(current) {
                let mut path: Vec<String> = chain.iter().map(|wit| wit.id.to_string()).collect();
                path.push(current.to_string());
                return Err(SchemaError::InheritanceCycle {
                    path: path.join(" -> "),
                });
            }
            if chain.len() > self.config.max_inheritance_depth {
                return Err(SchemaError::InheritanceTooDeep {
                    id: id.to_string(),
                    max: self.config.max_inheritance_depth,
                });
            }
            let work_item_type = self.store.load(&current).await?;
            next = work_item_type.base_type_id;
            chain.push(work_item_type);
        }
        Ok(chain)
    }

    /// Validate the full field set of a work item.
    ///
    /// Names outside the schema are rejected first. Then every schema field is
    /// checked in schema order: absent required fields fail, present values
    /// are converted to stored form. With `fill_defaults`, optional enum and
    /// list fields missing from the payload get their type default; a name
    /// submitted as `None` is left cleared.
    #[instrument(skip(self, payload), fields(count = payload.len()))]
    pub async fn validate_fields(&self, id: &WorkItemTypeId, payload: &Payload) -> Result<FieldValues> {
        let schema = self.resolve_schema(id).await?;
        if let Some(unknown) = payload.keys().find(|name| !schema.contains_key(*name)) {
            return Err(FieldsError::unknown_field(unknown.as_str()).into());
        }

        let mut values = FieldValues::new();
        for (name, definition) in schema.iter() {
            let submitted = payload.get(name).and_then(Option::as_ref);
            let stored = match definition.validate(name, submitted)? {
                None if self.config.fill_defaults && !payload.contains_key(name) => {
                    definition.field_type.default_value()
                }
                other => other,
            };
            if let Some(value) = stored {
                values.insert(name.clone(), value);
            }
        }
        Ok(values)
    }

    /// Validate an update: `changes` are applied over the stored `current`
    /// values (a `None` clears the field, even one with a type default) and
    /// the result is validated whole.
    pub async fn validate_update(
        &self,
        id: &WorkItemTypeId,
        current: &FieldValues,
        changes: &Payload,
    ) -> Result<FieldValues> {
        let mut merged: Payload = current
            .iter()
            .map(|(name, value)| (name.clone(), Some(value.clone())))
            .collect();
        for (name, value) in changes {
            merged.insert(name.clone(), value.clone());
        }
        self.validate_fields(id, &merged).await
    }

    /// Add or redefine fields on an existing work item type.
    ///
    /// A redefinition, including one of an inherited field, must enclose the
    /// current definition so that stored data stays valid. New names are
    /// appended. Cached schemas of the type and its descendants are dropped.
    #[instrument(skip(self, definitions), fields(count = definitions.len()))]
    pub async fn add_fields(
        &self,
        id: &WorkItemTypeId,
        definitions: IndexMap<String, FieldDefinition>,
    ) -> Result<ResolvedWorkItemType> {
        validate_definitions(&definitions)?;

        let guard = self.writes.lock().await;
        let current = self.resolve_schema(id).await?;
        for (name, definition) in &definitions {
            if let Some(existing) = current.get(name) {
                if !definition.equal_enclosing(existing) {
                    return Err(SchemaError::conflict(
                        name.as_str(),
                        format!(
                            "{} {} does not accept all values of {} {}",
                            requiredness(definition),
                            definition.kind(),
                            requiredness(existing),
                            existing.kind()
                        ),
                    ));
                }
            }
        }

        let mut work_item_type = self.store.load(id).await?;
        for (name, definition) in definitions {
            work_item_type.fields.insert(name, definition);
        }
        self.store.save(&work_item_type).await?;
        let dropped = self.cache.invalidate(id).await;
        info!(%id, dropped, "extended work item type");

        drop(guard);
        self.resolve(id).await
    }

    /// All work item types, own fields only.
    pub async fn list(&self) -> Result<Vec<WorkItemType>> {
        self.store.list().await
    }

    /// Create a category.
    pub async fn create_category(&self, category: Category) -> Result<Category> {
        if category.name.trim().is_empty() {
            return Err(SchemaError::bad_parameter("name", "must not be blank"));
        }
        self.store.save_category(&category).await?;
        Ok(category)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        self.store.list_categories().await
    }

    /// Attach a work item type to more categories.
    pub async fn link_categories(&self, id: &WorkItemTypeId, categories: &[CategoryId]) -> Result<()> {
        self.store.link_categories(id, categories).await
    }

    /// Categories a work item type belongs to.
    pub async fn categories_of(&self, id: &WorkItemTypeId) -> Result<Vec<Category>> {
        let ids = self.store.categories_of(id).await?;
        let mut categories = Vec::with_capacity(ids.len());
        for category in &ids {
            categories.push(self.store.load_category(category).await?);
        }
        Ok(categories)
    }

    /// Work item types in a category, own fields only.
    pub async fn work_item_types_in(&self, category: &CategoryId) -> Result<Vec<WorkItemType>> {
        let ids = self.store.work_item_types_in(category).await?;
        let mut types = Vec::with_capacity(ids.len());
        for id in &ids {
            types.push(self.store.load(id).await?);
        }
        Ok(types)
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }
}

fn validate_definitions(fields: &IndexMap<String, FieldDefinition>) -> Result<()> {
    for (name, definition) in fields {
        if name.trim().is_empty() {
            return Err(SchemaError::bad_parameter("fields", "field names must not be blank"));
        }
        definition
            .field_type
            .validate()
            .map_err(|source| SchemaError::InvalidFieldType {
                field: name.clone(),
                source,
            })?;
    }
    Ok(())
}

fn requiredness(definition: &FieldDefinition) -> &'static str {
    if definition.required {
        "required"
    } else {
        "optional"
    }
}
