//! Persistence seam for work item types, categories and their links

mod memory;
mod yaml;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Category, CategoryId, WorkItemType, WorkItemTypeId};

pub use memory::MemoryStore;
pub use yaml::{YamlStore, YamlStoreBuilder};

/// A definition file that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub error: String,
}

/// Storage for work item types and categories.
///
/// Stores hold own fields only; flattening inheritance is the engine's job.
/// Implementations must be safe to share across tasks.
#[async_trait]
pub trait WorkItemTypeStore: Send + Sync {
    /// Load a work item type by id.
    async fn load(&self, id: &WorkItemTypeId) -> Result<WorkItemType>;

    /// Insert or replace a work item type.
    async fn save(&self, work_item_type: &WorkItemType) -> Result<()>;

    /// All work item types, ordered by id.
    async fn list(&self) -> Result<Vec<WorkItemType>>;

    /// Insert or replace a category.
    async fn save_category(&self, category: &Category) -> Result<()>;

    /// Load a category by id.
    async fn load_category(&self, id: &CategoryId) -> Result<Category>;

    /// All categories, ordered by id.
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Attach a work item type to categories. Linking twice is a no-op; any
    /// unknown id fails the whole call.
    async fn link_categories(&self, id: &WorkItemTypeId, categories: &[CategoryId]) -> Result<()>;

    /// Categories a work item type belongs to.
    async fn categories_of(&self, id: &WorkItemTypeId) -> Result<Vec<CategoryId>>;

    /// Work item types that belong to a category.
    async fn work_item_types_in(&self, category: &CategoryId) -> Result<Vec<WorkItemTypeId>>;

    /// Definitions found in storage but left out because they failed to parse.
    fn skipped_files(&self) -> Vec<SkippedFile> {
        Vec::new()
    }
}
