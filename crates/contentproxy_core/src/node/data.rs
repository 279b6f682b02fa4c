//! Raw node records as stored by the content repository.

use crate::types::{ContentObjectRef, NodeIdentifier};
use crate::value::PropertyMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A raw node record in one workspace.
///
/// `NodeData` is what the repository persists; a [`super::Node`] is a
/// record materialised under a context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Node identifier.
    pub identifier: NodeIdentifier,
    /// Absolute path in the tree, e.g. `/sites/shop/products/chair`.
    pub path: String,
    /// Workspace the record belongs to.
    pub workspace: String,
    /// Name of the node type.
    pub node_type: String,
    /// Node properties.
    #[serde(default)]
    pub properties: PropertyMap,
    /// Bound entity, if this node proxies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_object: Option<ContentObjectRef>,
    /// Hidden nodes are only visible to contexts showing invisible content.
    #[serde(default)]
    pub hidden: bool,
    /// Removed nodes are only visible to contexts showing removed content.
    #[serde(default)]
    pub removed: bool,
    /// Dimension values, e.g. `language: [en_US]`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dimensions: BTreeMap<String, Vec<String>>,
}

impl NodeData {
    /// Creates a visible record without properties.
    pub fn new(
        identifier: impl Into<NodeIdentifier>,
        path: impl Into<String>,
        workspace: impl Into<String>,
        node_type: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            path: path.into(),
            workspace: workspace.into(),
            node_type: node_type.into(),
            properties: PropertyMap::new(),
            content_object: None,
            hidden: false,
            removed: false,
            dimensions: BTreeMap::new(),
        }
    }

    /// Sets a property.
    #[must_use]
    pub fn with_property(
        mut self,
        name: impl Into<String>,
        value: impl Into<crate::value::Value>,
    ) -> Self {
        self.properties.insert(name, value);
        self
    }

    /// Binds the record to an entity.
    #[must_use]
    pub fn with_content_object(mut self, reference: ContentObjectRef) -> Self {
        self.content_object = Some(reference);
        self
    }

    /// Marks the record hidden.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Marks the record removed.
    #[must_use]
    pub fn removed(mut self) -> Self {
        self.removed = true;
        self
    }

    /// Sets the values of one dimension.
    #[must_use]
    pub fn with_dimension(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.dimensions.insert(name.into(), values);
        self
    }

    /// Last path segment.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}
