//! Node types and the entity-to-node property mapping they declare.

use crate::types::EntityType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Option key under which node types declare property mappings, keyed by
/// entity type.
pub const PROXY_MAPPING_OPTION: &str = "contentObjectProxyMapping";

/// Declarative schema of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeType {
    /// Node type name, e.g. `Acme.Shop:ProductPage`.
    pub name: String,
    /// Property used as the node label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_property: Option<String>,
    /// Free-form options.
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl NodeType {
    /// Creates a node type without options.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label_property: None,
            options: serde_json::Map::new(),
        }
    }

    /// Sets the label property.
    #[must_use]
    pub fn with_label_property(mut self, property: impl Into<String>) -> Self {
        self.label_property = Some(property.into());
        self
    }

    /// Declares a mapping of `entity_property` to `node_property` for
    /// entities of `entity_type`, under [`PROXY_MAPPING_OPTION`].
    #[must_use]
    pub fn with_proxy_mapping(
        mut self,
        entity_type: &str,
        entity_property: &str,
        node_property: &str,
    ) -> Self {
        let mappings = self
            .options
            .entry(PROXY_MAPPING_OPTION)
            .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
        if let serde_json::Value::Object(by_type) = mappings {
            let fields = by_type
                .entry(entity_type)
                .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
            if let serde_json::Value::Object(fields) = fields {
                fields.insert(
                    entity_property.to_owned(),
                    serde_json::Value::String(node_property.to_owned()),
                );
            }
        }
        self
    }

    /// Returns the options.
    pub fn options(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.options
    }

    /// Reads the mapping declared for `entity_type` under `option_key`.
    ///
    /// Missing or malformed entries yield an empty mapping; entries whose
    /// target is not a string are ignored.
    pub fn proxy_mapping(&self, option_key: &str, entity_type: &EntityType) -> ProxyMapping {
        let fields = self
            .options
            .get(option_key)
            .and_then(|by_type| by_type.get(entity_type.as_str()))
            .and_then(serde_json::Value::as_object);

        let renames: BTreeMap<String, String> = fields
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(|(from, to)| to.as_str().map(|to| (from.clone(), to.to_owned())))
                    .collect()
            })
            .unwrap_or_default();

        ProxyMapping { renames }
    }
}

/// Entity-property to node-property renames for one (node type, entity type)
/// pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyMapping {
    renames: BTreeMap<String, String>,
}

impl ProxyMapping {
    /// Resolves the node property written for an entity property.
    pub fn target<'a>(&'a self, entity_property: &'a str) -> &'a str {
        self.renames
            .get(entity_property)
            .map_or(entity_property, String::as_str)
    }

    /// Returns true if there are no renames.
    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_from_options() {
        let node_type = NodeType::new("Acme.Shop:ProductPage")
            .with_proxy_mapping("Acme.Shop:Product", "name", "title")
            .with_proxy_mapping("Acme.Shop:Product", "body", "text")
            .with_proxy_mapping("Acme.Shop:Brand", "name", "headline");

        let mapping =
            node_type.proxy_mapping(PROXY_MAPPING_OPTION, &EntityType::from("Acme.Shop:Product"));
        assert_eq!(mapping.target("name"), "title");
        assert_eq!(mapping.target("body"), "text");
        assert_eq!(mapping.target("price"), "price");

        let brand =
            node_type.proxy_mapping(PROXY_MAPPING_OPTION, &EntityType::from("Acme.Shop:Brand"));
        assert_eq!(brand.target("name"), "headline");
    }

    #[test]
    fn missing_or_malformed_mapping_is_empty() {
        let json = r#"{
            "name": "T",
            "options": {"contentObjectProxyMapping": {"A": "not-a-map", "B": {"x": 3, "y": "z"}}}
        }"#;
        let node_type: NodeType = serde_json::from_str(json).unwrap();

        assert!(node_type
            .proxy_mapping(PROXY_MAPPING_OPTION, &EntityType::from("A"))
            .is_empty());
        assert!(node_type
            .proxy_mapping(PROXY_MAPPING_OPTION, &EntityType::from("C"))
            .is_empty());

        let b = node_type.proxy_mapping(PROXY_MAPPING_OPTION, &EntityType::from("B"));
        assert_eq!(b.target("x"), "x");
        assert_eq!(b.target("y"), "z");
    }
}
