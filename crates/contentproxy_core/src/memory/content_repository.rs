//! In-memory content repository.

use crate::error::{CoreError, CoreResult};
use crate::node::{NodeData, NodeType};
use crate::repository::ContentRepository;
use crate::types::{EntityIdentifier, NodeIdentifier};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A content repository holding all records in memory.
///
/// Changes registered through [`ContentRepository::update`] are staged and
/// only become visible to readers after [`ContentRepository::persist_all`].
///
/// # Thread Safety
///
/// All state sits behind locks; the repository can be shared across threads.
#[derive(Debug, Default)]
pub struct MemoryContentRepository {
    records: RwLock<Vec<NodeData>>,
    node_types: RwLock<HashMap<String, Arc<NodeType>>>,
    staged: Mutex<Vec<NodeData>>,
    flushes: AtomicU64,
}

impl MemoryContentRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a node type.
    pub fn register_node_type(&self, node_type: NodeType) {
        self.node_types
            .write()
            .insert(node_type.name.clone(), Arc::new(node_type));
    }

    /// Stores a record directly, replacing one with the same identifier and
    /// workspace.
    pub fn insert(&self, data: NodeData) {
        let mut records = self.records.write();
        match records
            .iter_mut()
            .find(|r| r.identifier == data.identifier && r.workspace == data.workspace)
        {
            Some(slot) => *slot = data,
            None => records.push(data),
        }
    }

    /// Reads a committed record.
    pub fn get(&self, identifier: &NodeIdentifier, workspace: &str) -> Option<NodeData> {
        self.records
            .read()
            .iter()
            .find(|r| &r.identifier == identifier && r.workspace == workspace)
            .cloned()
    }

    /// All committed records in insertion order.
    pub fn records(&self) -> Vec<NodeData> {
        self.records.read().clone()
    }

    /// All declared node types, sorted by name.
    pub fn node_types(&self) -> Vec<NodeType> {
        let mut types: Vec<NodeType> = self
            .node_types
            .read()
            .values()
            .map(|t| NodeType::clone(t))
            .collect();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        types
    }

    /// Number of `persist_all` calls so far.
    pub fn flush_count(&self) -> u64 {
        self.flushes.load(Ordering::SeqCst)
    }

    /// Number of staged, unflushed changes.
    pub fn pending_count(&self) -> usize {
        self.staged.lock().len()
    }

    /// Drops staged changes without committing them.
    pub fn discard_pending(&self) {
        self.staged.lock().clear();
    }
}

impl ContentRepository for MemoryContentRepository {
    fn find_by_content_object(
        &self,
        identifier: &EntityIdentifier,
        workspace: &str,
    ) -> CoreResult<Vec<NodeData>> {
        Ok(self
            .records
            .read()
            .iter()
            .filter(|r| r.workspace == workspace)
            .filter(|r| {
                r.content_object
                    .as_ref()
                    .is_some_and(|c| &c.identifier == identifier)
            })
            .cloned()
            .collect())
    }

    fn node_type(&self, name: &str) -> CoreResult<Arc<NodeType>> {
        self.node_types
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::NodeTypeNotFound {
                name: name.to_owned(),
            })
    }

    fn update(&self, data: &NodeData) -> CoreResult<()> {
        if self.get(&data.identifier, &data.workspace).is_none() {
            return Err(CoreError::NodeNotFound {
                identifier: data.identifier.clone(),
                workspace: data.workspace.clone(),
            });
        }

        let mut staged = self.staged.lock();
        match staged
            .iter_mut()
            .find(|r| r.identifier == data.identifier && r.workspace == data.workspace)
        {
            Some(slot) => *slot = data.clone(),
            None => staged.push(data.clone()),
        }
        Ok(())
    }

    fn persist_all(&self) -> CoreResult<()> {
        let staged = std::mem::take(&mut *self.staged.lock());
        for data in staged {
            self.insert(data);
        }
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
