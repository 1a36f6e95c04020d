//! In-memory work item type store and the catalog shared with the YAML store

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::WorkItemTypeStore;
use crate::error::{Result, SchemaError};
use crate::types::{Category, CategoryId, WorkItemType, WorkItemTypeId};

/// One membership of a work item type in a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub(crate) struct CategoryLink {
    pub work_item_type: WorkItemTypeId,
    pub category: CategoryId,
}

/// Indexed work item types, categories and links, shared by the stores.
#[derive(Debug, Default)]
pub(crate) struct Catalog {
    types: BTreeMap<WorkItemTypeId, WorkItemType>,
    categories: BTreeMap<CategoryId, Category>,
    links: BTreeSet<CategoryLink>,
}

impl Catalog {
    pub fn load(&self, id: &WorkItemTypeId) -> Result<WorkItemType> {
        self.types
            .get(id)
            .cloned()
            .ok_or_else(|| SchemaError::WorkItemTypeNotFound { id: id.to_string() })
    }

    pub fn contains(&self, id: &WorkItemTypeId) -> bool {
        self.types.contains_key(id)
    }

    pub fn save(&mut self, work_item_type: WorkItemType) {
        self.types.insert(work_item_type.id, work_item_type);
    }

    pub fn list(&self) -> Vec<WorkItemType> {
        self.types.values().cloned().collect()
    }

    pub fn load_category(&self, id: &CategoryId) -> Result<Category> {
        self.categories
            .get(id)
            .cloned()
            .ok_or_else(|| SchemaError::CategoryNotFound { id: id.to_string() })
    }

    pub fn contains_category(&self, id: &CategoryId) -> bool {
        self.categories.contains_key(id)
    }

    pub fn save_category(&mut self, category: Category) {
        self.categories.insert(category.id, category);
    }

    pub fn list_categories(&self) -> Vec<Category> {
        self.categories.values().cloned().collect()
    }

    /// Add links after checking every id. Returns whether anything changed.
    pub fn link(&mut self, id: &WorkItemTypeId, categories: &[CategoryId]) -> Result<bool> {
        if !self.contains(id) {
            return Err(SchemaError::WorkItemTypeNotFound { id: id.to_string() });
        }
        if let Some(missing) = categories.iter().find(|c| !self.contains_category(c)) {
            return Err(SchemaError::CategoryNotFound {
                id: missing.to_string(),
            });
        }
        let mut changed = false;
        for category in categories {
            changed |= self.links.insert(CategoryLink {
                work_item_type: *id,
                category: *category,
            });
        }
        Ok(changed)
    }

    pub fn insert_link(&mut self, link: CategoryLink) {
        self.links.insert(link);
    }

    pub fn restore_links(&mut self, links: Vec<CategoryLink>) {
        self.links = links.into_iter().collect();
    }

    pub fn links(&self) -> Vec<CategoryLink> {
        self.links.iter().copied().collect()
    }

    pub fn categories_of(&self, id: &WorkItemTypeId) -> Result<Vec<CategoryId>> {
        if !self.contains(id) {
            return Err(SchemaError::WorkItemTypeNotFound { id: id.to_string() });
        }
        Ok(self
            .links
            .iter()
            .filter(|link| link.work_item_type == *id)
            .map(|link| link.category)
            .collect())
    }

    pub fn work_item_types_in(&self, category: &CategoryId) -> Result<Vec<WorkItemTypeId>> {
        if !self.contains_category(category) {
            return Err(SchemaError::CategoryNotFound {
                id: category.to_string(),
            });
        }
        Ok(self
            .links
            .iter()
            .filter(|link| link.category == *category)
            .map(|link| link.work_item_type)
            .collect())
    }
}

/// Volatile store, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    catalog: RwLock<Catalog>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with the given categories.
    pub fn with_categories(categories: impl IntoIterator<Item = Category>) -> Self {
        let mut catalog = Catalog::default();
        for category in categories {
            catalog.save_category(category);
        }
        Self {
            catalog: RwLock::new(catalog),
        }
    }
}

#[async_trait]
impl WorkItemTypeStore for MemoryStore {
    async fn load(&self, id: &WorkItemTypeId) -> Result<WorkItemType> {
        self.catalog.read().await.load(id)
    }

    async fn save(&self, work_item_type: &WorkItemType) -> Result<()> {
        self.catalog.write().await.save(work_item_type.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<WorkItemType>> {
        Ok(self.catalog.read().await.list())
    }

    async fn save_category(&self, category: &Category) -> Result<()> {
        self.catalog.write().await.save_category(category.clone());
        Ok(())
    }

    async fn load_category(&self, id: &CategoryId) -> Result<Category> {
        self.catalog.read().await.load_category(id)
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.catalog.read().await.list_categories())
    }

    async fn link_categories(&self, id: &WorkItemTypeId, categories: &[CategoryId]) -> Result<()> {
        self.catalog.write().await.link(id, categories).map(|_| ())
    }

    async fn categories_of(&self, id: &WorkItemTypeId) -> Result<Vec<CategoryId>> {
        self.catalog.read().await.categories_of(id)
    }

    async fn work_item_types_in(&self, category: &CategoryId) -> Result<Vec<WorkItemTypeId>> {
        self.catalog.read().await.work_item_types_in(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn wit(name: &str) -> WorkItemType {
        WorkItemType {
            id: WorkItemTypeId::new(),
            name: name.to_string(),
            description: None,
            icon: None,
            base_type_id: None,
            fields: IndexMap::new(),
        }
    }

    #[tokio::test]
    async fn save_and_load() {
        let store = MemoryStore::new();
        let bug = wit("bug");
        store.save(&bug).await.unwrap();
        assert_eq!(store.load(&bug.id).await.unwrap(), bug);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn load_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store.load(&WorkItemTypeId::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn links_are_many_to_many_and_idempotent() {
        let store = MemoryStore::with_categories(Category::planner_defaults());
        let defaults = Category::planner_defaults();
        let (requirements, issues) = (defaults[0].id, defaults[1].id);
        let bug = wit("bug");
        let story = wit("story");
        store.save(&bug).await.unwrap();
        store.save(&story).await.unwrap();

        store
            .link_categories(&bug.id, &[requirements, issues])
            .await
            .unwrap();
        store.link_categories(&story.id, &[requirements]).await.unwrap();
        store.link_categories(&story.id, &[requirements]).await.unwrap();

        let mut of_bug = store.categories_of(&bug.id).await.unwrap();
        of_bug.sort();
        let mut expected = vec![requirements, issues];
        expected.sort();
        assert_eq!(of_bug, expected);

        let mut in_requirements = store.work_item_types_in(&requirements).await.unwrap();
        in_requirements.sort();
        let mut expected = vec![bug.id, story.id];
        expected.sort();
        assert_eq!(in_requirements, expected);
        assert_eq!(store.work_item_types_in(&issues).await.unwrap(), vec![bug.id]);
    }

    #[tokio::test]
    async fn link_unknown_category_changes_nothing() {
        let store = MemoryStore::with_categories(Category::planner_defaults());
        let known = Category::planner_defaults()[0].id;
        let bug = wit("bug");
        store.save(&bug).await.unwrap();

        let err = store
            .link_categories(&bug.id, &[known, CategoryId::new()])
            .await
            .unwrap_err();
        assert!(matches!(err, SchemaError::CategoryNotFound { .. }));
        assert!(store.categories_of(&bug.id).await.unwrap().is_empty());
    }
}
