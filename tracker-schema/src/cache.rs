//! Resolved schema cache

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::trace;

use crate::types::{Schema, WorkItemTypeId};

#[derive(Debug)]
struct Entry {
    schema: Arc<Schema>,
    /// The type itself followed by its ancestors.
    lineage: Vec<WorkItemTypeId>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<WorkItemTypeId, Entry>,
    generation: u64,
}

/// Flattened schemas keyed by work item type.
///
/// Clones share the same storage. Every entry remembers the chain it was
/// flattened from, so changing a type drops the cached schemas of all of
/// its descendants too.
#[derive(Debug, Clone, Default)]
pub struct SchemaCache {
    inner: Arc<RwLock<Inner>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: &WorkItemTypeId) -> Option<Arc<Schema>> {
        let inner = self.inner.read().await;
        inner.entries.get(id).map(|entry| Arc::clone(&entry.schema))
    }

    /// Current generation; bumped by every invalidation.
    pub async fn generation(&self) -> u64 {
        self.inner.read().await.generation
    }

    /// Store a schema resolved while the cache was at `generation`.
    ///
    /// Dropped if an invalidation happened in between, since the schema may
    /// have been built from data that has since changed.
    pub async fn insert(
        &self,
        generation: u64,
        lineage: Vec<WorkItemTypeId>,
        schema: Arc<Schema>,
    ) -> bool {
        let Some(id) = lineage.first().copied() else {
            return false;
        };
        let mut inner = self.inner.write().await;
        if inner.generation != generation {
            trace!(%id, "discarding schema resolved before invalidation");
            return false;
        }
        inner.entries.insert(id, Entry { schema, lineage });
        true
    }

    /// Drop `id` and every schema that inherits from it. Returns how many
    /// entries were removed.
    pub async fn invalidate(&self, id: &WorkItemTypeId) -> usize {
        let mut inner = self.inner.write().await;
        inner.generation += 1;
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.lineage.contains(id));
        let removed = before - inner.entries.len();
        trace!(%id, removed, "invalidated cached schemas");
        removed
    }

    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.generation += 1;
        inner.entries.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Arc<Schema> {
        Arc::new(Schema::new())
    }

    #[tokio::test]
    async fn insert_and_get() {
        let cache = SchemaCache::new();
        let id = WorkItemTypeId::new();
        let generation = cache.generation().await;
        assert!(cache.insert(generation, vec![id], schema()).await);
        assert!(cache.get(&id).await.is_some());
        assert!(cache.get(&WorkItemTypeId::new()).await.is_none());
    }

    #[tokio::test]
    async fn invalidate_drops_descendants() {
        let cache = SchemaCache::new();
        let (root, child, grandchild, other) = (
            WorkItemTypeId::new(),
            WorkItemTypeId::new(),
            WorkItemTypeId::new(),
            WorkItemTypeId::new(),
        );
        let generation = cache.generation().await;
        cache.insert(generation, vec![root], schema()).await;
        cache.insert(generation, vec![child, root], schema()).await;
        cache
            .insert(generation, vec![grandchild, child, root], schema())
            .await;
        cache.insert(generation, vec![other], schema()).await;

        assert_eq!(cache.invalidate(&child).await, 2);
        assert!(cache.get(&root).await.is_some());
        assert!(cache.get(&other).await.is_some());
        assert!(cache.get(&grandchild).await.is_none());
    }

    #[tokio::test]
    async fn stale_inserts_are_discarded() {
        let cache = SchemaCache::new();
        let id = WorkItemTypeId::new();
        let generation = cache.generation().await;
        cache.invalidate(&id).await;
        assert!(!cache.insert(generation, vec![id], schema()).await);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let cache = SchemaCache::new();
        let clone = cache.clone();
        let id = WorkItemTypeId::new();
        let generation = cache.generation().await;
        cache.insert(generation, vec![id], schema()).await;
        assert_eq!(clone.len().await, 1);
        clone.clear().await;
        assert!(cache.is_empty().await);
    }
}
