//! Work item type store backed by a directory of YAML files

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use ulid::Ulid;

use super::memory::{Catalog, CategoryLink};
use super::{SkippedFile, WorkItemTypeStore};
use crate::error::Result;
use crate::types::{Category, CategoryId, WorkItemType, WorkItemTypeId};

const TYPES_DIR: &str = "types";
const CATEGORIES_DIR: &str = "categories";
const LINKS_FILE: &str = "links.yaml";

/// Builder for [`YamlStore`]. Created by [`YamlStore::open`].
pub struct YamlStoreBuilder {
    root: PathBuf,
    defaults: Vec<Category>,
}

impl YamlStoreBuilder {
    /// Categories to seed on open. A category whose file already exists is
    /// left untouched.
    pub fn with_defaults(mut self, categories: impl IntoIterator<Item = Category>) -> Self {
        self.defaults.extend(categories);
        self
    }

    /// Create the directory layout, seed defaults and load everything on disk.
    pub async fn build(self) -> Result<YamlStore> {
        let root = self.root;
        fs::create_dir_all(root.join(TYPES_DIR)).await?;
        fs::create_dir_all(root.join(CATEGORIES_DIR)).await?;

        for category in &self.defaults {
            let path = category_path(&root, &category.id);
            if !path.exists() {
                atomic_write(&path, serde_yaml_ng::to_string(category)?.as_bytes()).await?;
                debug!(name = %category.name, id = %category.id, "seeded default category");
            }
        }

        let mut catalog = Catalog::default();
        let mut skipped = Vec::new();
        for work_item_type in load_dir::<WorkItemType>(&root.join(TYPES_DIR), &mut skipped).await? {
            catalog.save(work_item_type);
        }
        for category in load_dir::<Category>(&root.join(CATEGORIES_DIR), &mut skipped).await? {
            catalog.save_category(category);
        }

        let links_path = root.join(LINKS_FILE);
        if links_path.exists() {
            let content = fs::read_to_string(&links_path).await?;
            let links: Vec<CategoryLink> = serde_yaml_ng::from_str(&content)?;
            for link in links {
                if catalog.contains(&link.work_item_type)
                    && catalog.contains_category(&link.category)
                {
                    catalog.insert_link(link);
                } else {
                    warn!(
                        work_item_type = %link.work_item_type,
                        category = %link.category,
                        "skipping dangling category link"
                    );
                }
            }
        }

        debug!(
            root = %root.display(),
            types = catalog.list().len(),
            categories = catalog.list_categories().len(),
            skipped = skipped.len(),
            "yaml store opened"
        );

        Ok(YamlStore {
            root,
            catalog: RwLock::new(catalog),
            skipped,
        })
    }
}

/// Store backed by a directory of YAML files.
///
/// ```text
/// root/
///   types/        one <id>.yaml per work item type
///   categories/   one <id>.yaml per category
///   links.yaml    work item type / category memberships
/// ```
///
/// Everything is loaded on open; every write goes to disk before the
/// in-memory index is updated.
#[derive(Debug)]
pub struct YamlStore {
    root: PathBuf,
    catalog: RwLock<Catalog>,
    skipped: Vec<SkippedFile>,
}

impl YamlStore {
    /// Start opening a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> YamlStoreBuilder {
        YamlStoreBuilder {
            root: root.into(),
            defaults: Vec::new(),
        }
    }

    fn type_path(&self, id: &WorkItemTypeId) -> PathBuf {
        self.root.join(TYPES_DIR).join(format!("{id}.yaml"))
    }
}

fn category_path(root: &Path, id: &CategoryId) -> PathBuf {
    root.join(CATEGORIES_DIR).join(format!("{id}.yaml"))
}

#[async_trait]
impl WorkItemTypeStore for YamlStore {
    async fn load(&self, id: &WorkItemTypeId) -> Result<WorkItemType> {
        self.catalog.read().await.load(id)
    }

    async fn save(&self, work_item_type: &WorkItemType) -> Result<()> {
        let mut catalog = self.catalog.write().await;
        let yaml = serde_yaml_ng::to_string(work_item_type)?;
        atomic_write(&self.type_path(&work_item_type.id), yaml.as_bytes()).await?;
        catalog.save(work_item_type.clone());
        debug!(id = %work_item_type.id, name = %work_item_type.name, "saved work item type");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<WorkItemType>> {
        Ok(self.catalog.read().await.list())
    }

    async fn save_category(&self, category: &Category) -> Result<()> {
        let mut catalog = self.catalog.write().await;
        let yaml = serde_yaml_ng::to_string(category)?;
        atomic_write(&category_path(&self.root, &category.id), yaml.as_bytes()).await?;
        catalog.save_category(category.clone());
        Ok(())
    }

    async fn load_category(&self, id: &CategoryId) -> Result<Category> {
        self.catalog.read().await.load_category(id)
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.catalog.read().await.list_categories())
    }

    async fn link_categories(&self, id: &WorkItemTypeId, categories: &[CategoryId]) -> Result<()> {
        let mut catalog = self.catalog.write().await;
        let previous = catalog.links();
        if !catalog.link(id, categories)? {
            return Ok(());
        }
        let yaml = serde_yaml_ng::to_string(&catalog.links())?;
        if let Err(e) = atomic_write(&self.root.join(LINKS_FILE), yaml.as_bytes()).await {
            catalog.restore_links(previous);
            return Err(e);
        }
        Ok(())
    }

    async fn categories_of(&self, id: &WorkItemTypeId) -> Result<Vec<CategoryId>> {
        self.catalog.read().await.categories_of(id)
    }

    async fn work_item_types_in(&self, category: &CategoryId) -> Result<Vec<WorkItemTypeId>> {
        self.catalog.read().await.work_item_types_in(category)
    }

    fn skipped_files(&self) -> Vec<SkippedFile> {
        self.skipped.clone()
    }
}

/// Read every `.yaml` file in `dir`. Files that fail to parse are recorded in
/// `skipped`.
async fn load_dir<T: DeserializeOwned>(dir: &Path, skipped: &mut Vec<SkippedFile>) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
            continue;
        }
        let content = fs::read_to_string(&path).await?;
        match serde_yaml_ng::from_str::<T>(&content) {
            Ok(item) => items.push(item),
            Err(e) => {
                warn!(?path, %e, "skipping invalid definition");
                skipped.push(SkippedFile {
                    path,
                    error: e.to_string(),
                });
            }
        }
    }
    Ok(items)
}

/// Write to a temp file then rename for atomic persistence.
async fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "no parent dir"))?;
    let tmp = dir.join(format!(".tmp_{}", Ulid::new()));
    fs::write(&tmp, data).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}
