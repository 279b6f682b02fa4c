//! Node factory with a per-request identity map.

use super::{Context, Node, NodeData};
use crate::error::CoreResult;
use crate::repository::ContentRepository;
use crate::types::NodeIdentifier;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Materialises [`NodeData`] records into [`Node`] handles.
///
/// Within one request the factory returns the same handle for the same
/// record and context. [`NodeFactory::reset`] drops that identity map; it
/// must be called after mutations so later reads see fresh records.
pub struct NodeFactory {
    repository: Arc<dyn ContentRepository>,
    nodes: Mutex<HashMap<(String, NodeIdentifier), Arc<Node>>>,
}

impl NodeFactory {
    /// Creates a factory reading node types from `repository`.
    pub fn new(repository: Arc<dyn ContentRepository>) -> Self {
        Self {
            repository,
            nodes: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the handle for `data` under `context`.
    pub fn create_from_node_data(
        &self,
        data: NodeData,
        context: &Context,
    ) -> CoreResult<Arc<Node>> {
        let key = (context.config().identity(), data.identifier.clone());
        if let Some(node) = self.nodes.lock().get(&key) {
            return Ok(Arc::clone(node));
        }

        let node_type = self.repository.node_type(&data.node_type)?;
        let node = Arc::new(Node::new(data, node_type, Arc::clone(&self.repository)));
        self.nodes.lock().insert(key, Arc::clone(&node));
        Ok(node)
    }

    /// Number of handles in the identity map.
    pub fn len(&self) -> usize {
        self.nodes.lock().len()
    }

    /// Returns true if the identity map is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops the identity map.
    pub fn reset(&self) {
        self.nodes.lock().clear();
    }
}

impl std::fmt::Debug for NodeFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeFactory")
            .field("nodes", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryContentRepository;
    use crate::node::{ContextConfig, NodeType};
    use crate::value::Value;

    fn repository() -> Arc<MemoryContentRepository> {
        let repository = MemoryContentRepository::new();
        repository.register_node_type(
            NodeType::new("Acme.Shop:ProductPage").with_label_property("title"),
        );
        Arc::new(repository)
    }

    fn record() -> NodeData {
        NodeData::new("n-1", "/sites/shop/chair", "live", "Acme.Shop:ProductPage")
            .with_property("title", "Chair")
    }

    #[test]
    fn identity_map_until_reset() {
        let factory = NodeFactory::new(repository());
        let context = Context::new(ContextConfig::new("live"));

        let a = factory.create_from_node_data(record(), &context).unwrap();
        let b = factory.create_from_node_data(record(), &context).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(factory.len(), 1);

        factory.reset();
        let c = factory.create_from_node_data(record(), &context).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn separate_handles_per_context() {
        let factory = NodeFactory::new(repository());
        let live = Context::new(ContextConfig::new("live"));
        let backend = Context::new(ContextConfig::new("live").with_invisible_content_shown(true));

        let a = factory.create_from_node_data(record(), &live).unwrap();
        let b = factory.create_from_node_data(record(), &backend).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn unknown_node_type_fails() {
        let factory = NodeFactory::new(repository());
        let context = Context::new(ContextConfig::new("live"));
        let data = NodeData::new("n-2", "/x", "live", "Missing:Type");

        assert!(factory.create_from_node_data(data, &context).is_err());
    }

    #[test]
    fn node_accessors_and_writes() {
        let repository = repository();
        let factory = NodeFactory::new(repository.clone());
        let context = Context::new(ContextConfig::new("live"));
        repository.insert(record());

        let node = factory.create_from_node_data(record(), &context).unwrap();
        assert_eq!(node.label(), "Chair");
        assert_eq!(node.path(), "/sites/shop/chair");
        assert_eq!(node.workspace_name(), "live");
        assert!(node.has_property("title"));
        assert!(!node.has_property("price"));

        let previous = node.set_property("title", Value::from("Armchair")).unwrap();
        assert_eq!(previous, Some(Value::from("Chair")));
        assert_eq!(node.label(), "Armchair");

        // Not durable until flushed.
        let stored = repository.get(&"n-1".into(), "live").unwrap();
        assert_eq!(stored.properties.get("title"), Some(&Value::from("Chair")));

        repository.persist_all().unwrap();
        let stored = repository.get(&"n-1".into(), "live").unwrap();
        assert_eq!(stored.properties.get("title"), Some(&Value::from("Armchair")));
    }
}
