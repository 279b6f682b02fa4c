//! Content tree model: node records, node types, contexts and the
//! materialised [`Node`] handle.

mod context;
mod data;
mod factory;
mod node_type;

pub use context::{ContextConfig, Context, ContextFactory, FirstLevelNodeCache, LIVE_WORKSPACE};
pub use data::NodeData;
pub use factory::NodeFactory;
pub use node_type::{NodeType, ProxyMapping, PROXY_MAPPING_OPTION};

use crate::error::CoreResult;
use crate::repository::ContentRepository;
use crate::types::{ContentObjectRef, NodeIdentifier};
use crate::value::Value;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// A node record materialised under a context.
///
/// Identity, path and workspace are fixed for the lifetime of the handle;
/// properties are read and written through interior mutability. Writes are
/// registered with the repository's unit of work and become durable on the
/// next [`ContentRepository::persist_all`].
pub struct Node {
    identifier: NodeIdentifier,
    path: String,
    workspace: String,
    node_type: Arc<NodeType>,
    data: RwLock<NodeData>,
    repository: Arc<dyn ContentRepository>,
}

impl Node {
    pub(crate) fn new(
        data: NodeData,
        node_type: Arc<NodeType>,
        repository: Arc<dyn ContentRepository>,
    ) -> Self {
        Self {
            identifier: data.identifier.clone(),
            path: data.path.clone(),
            workspace: data.workspace.clone(),
            node_type,
            data: RwLock::new(data),
            repository,
        }
    }

    /// Node identifier.
    pub fn identifier(&self) -> &NodeIdentifier {
        &self.identifier
    }

    /// Absolute path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Name of the workspace the node was read from.
    pub fn workspace_name(&self) -> &str {
        &self.workspace
    }

    /// Node type.
    pub fn node_type(&self) -> &NodeType {
        &self.node_type
    }

    /// Human readable label: the node type's label property when it holds
    /// text, the node name otherwise.
    pub fn label(&self) -> String {
        let data = self.data.read();
        self.node_type
            .label_property
            .as_deref()
            .and_then(|property| data.properties.get(property))
            .and_then(Value::as_text)
            .map_or_else(|| data.name().to_owned(), str::to_owned)
    }

    /// Entity this node mirrors, if any.
    pub fn content_object(&self) -> Option<ContentObjectRef> {
        self.data.read().content_object.clone()
    }

    /// Returns true if the property is defined on the node.
    pub fn has_property(&self, name: &str) -> bool {
        self.data.read().properties.contains(name)
    }

    /// Reads a property.
    pub fn property(&self, name: &str) -> Option<Value> {
        self.data.read().properties.get(name).cloned()
    }

    /// Writes a property and registers the change with the repository.
    ///
    /// Returns the previous value.
    pub fn set_property(&self, name: &str, value: Value) -> CoreResult<Option<Value>> {
        let snapshot = {
            let mut data = self.data.write();
            let previous = data.properties.insert(name, value);
            (previous, data.clone())
        };
        self.repository.update(&snapshot.1)?;
        Ok(snapshot.0)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("identifier", &self.identifier)
            .field("path", &self.path)
            .field("workspace", &self.workspace)
            .field("node_type", &self.node_type.name)
            .finish()
    }
}
