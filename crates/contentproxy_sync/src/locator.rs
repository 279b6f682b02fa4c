//! Lookup of the content nodes bound to an entity.

use crate::error::SyncResult;
use contentproxy_core::{ContentRepository, Context, EntityIdentifier, Node, NodeFactory};
use std::sync::Arc;

/// Finds the nodes mirroring one entity under a context.
pub struct NodeLocator {
    repository: Arc<dyn ContentRepository>,
    factory: Arc<NodeFactory>,
}

impl NodeLocator {
    /// Creates a locator reading from `repository` and materialising
    /// through `factory`.
    pub fn new(repository: Arc<dyn ContentRepository>, factory: Arc<NodeFactory>) -> Self {
        Self {
            repository,
            factory,
        }
    }

    /// Returns all nodes bound to `identifier` that are visible in
    /// `context`, in repository order. An unbound entity yields an empty
    /// list.
    ///
    /// Nodes already held by the context's first-level cache are returned
    /// from there; new ones are materialised and cached.
    pub fn locate(
        &self,
        identifier: &EntityIdentifier,
        context: &Context,
    ) -> SyncResult<Vec<Arc<Node>>> {
        let records = self
            .repository
            .find_by_content_object(identifier, context.workspace_name())?;

        let mut nodes = Vec::with_capacity(records.len());
        for data in records {
            if !context.is_visible(&data) {
                tracing::trace!(node = %data.identifier, "node not visible in context");
                continue;
            }
            let cache = context.first_level_cache();
            let node = match cache.get_by_identifier(&data.identifier) {
                Some(node) => node,
                None => {
                    let node = self.factory.create_from_node_data(data, context)?;
                    cache.set(Arc::clone(&node));
                    node
                }
            };
            nodes.push(node);
        }
        Ok(nodes)
    }
}

impl std::fmt::Debug for NodeLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeLocator")
            .field("factory", &self.factory)
            .finish()
    }
}
