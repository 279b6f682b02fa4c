//! Content repository contract.

use crate::error::CoreResult;
use crate::node::{NodeData, NodeType};
use crate::types::EntityIdentifier;
use std::sync::Arc;

/// Storage of the content tree, seen from the synchronization engine.
///
/// The engine never creates, moves or deletes records. It reads records
/// bound to an entity, and writes changed properties back through the
/// unit of work: [`ContentRepository::update`] then
/// [`ContentRepository::persist_all`].
pub trait ContentRepository: Send + Sync {
    /// Returns all records in `workspace` bound to the entity `identifier`,
    /// in a stable order.
    fn find_by_content_object(
        &self,
        identifier: &EntityIdentifier,
        workspace: &str,
    ) -> CoreResult<Vec<NodeData>>;

    /// Resolves a node type by name.
    fn node_type(&self, name: &str) -> CoreResult<Arc<NodeType>>;

    /// Registers a changed record for the next flush.
    fn update(&self, data: &NodeData) -> CoreResult<()>;

    /// Commits all registered changes.
    fn persist_all(&self) -> CoreResult<()>;
}
