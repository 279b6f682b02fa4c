//! Diffing entity properties against a node and writing the differences.

use crate::error::{SyncError, SyncResult};
use crate::guard::SynchronizationGuard;
use contentproxy_core::{
    ContentRepository, Context, EntityType, Node, NodeFactory, PropertyMap, ProxyMapping,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Writes entity property values onto bound nodes.
pub struct PropertyApplier {
    repository: Arc<dyn ContentRepository>,
    factory: Arc<NodeFactory>,
    option_key: String,
    mappings: RwLock<HashMap<(String, EntityType), Arc<ProxyMapping>>>,
}

impl PropertyApplier {
    /// Creates an applier reading rename mappings from the node type option
    /// `option_key`.
    pub fn new(
        repository: Arc<dyn ContentRepository>,
        factory: Arc<NodeFactory>,
        option_key: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            factory,
            option_key: option_key.into(),
            mappings: RwLock::new(HashMap::new()),
        }
    }

    /// Applies `properties` of an entity of `entity_type` to `node`.
    ///
    /// A property is written only if the node already defines it and the
    /// value differs; properties the node lacks are skipped. Renames from
    /// the node type's mapping decide the written name, while the
    /// comparison uses the entity's name. Returns true if anything was
    /// written.
    ///
    /// Writes run with `guard` suppressed and are flushed once. Afterwards
    /// the node factory and the context's first-level cache are reset, also
    /// when a write or the flush failed.
    pub fn apply(
        &self,
        guard: &SynchronizationGuard,
        node: &Node,
        properties: &PropertyMap,
        entity_type: &EntityType,
        context: &Context,
    ) -> SyncResult<bool> {
        let content_object = node
            .content_object()
            .ok_or_else(|| SyncError::MissingContentObject {
                node: node.identifier().clone(),
            })?;

        if properties.is_empty() {
            return Ok(false);
        }

        let mapping = self.mapping(node, entity_type);
        let outcome = guard.run_suppressed(|| -> SyncResult<bool> {
            let mut updated = false;
            for (name, value) in properties.iter() {
                if !node.has_property(name) {
                    tracing::trace!(
                        node = %node.identifier(),
                        property = name,
                        "node lacks property"
                    );
                    continue;
                }
                let previous = node.property(name);
                if previous.as_ref() == Some(value) {
                    continue;
                }

                let target = mapping.target(name);
                node.set_property(target, value.clone())?;
                tracing::info!(
                    module = "content-object-proxy",
                    action = "node-property-updated",
                    node = %node.identifier(),
                    path = node.path(),
                    content_object = %content_object,
                    property = target,
                    previous = ?previous,
                    value = %value,
                    "node property updated"
                );
                updated = true;
            }
            self.repository.persist_all()?;
            Ok(updated)
        });

        // Handles may hold unflushed writes even when the pass failed.
        self.factory.reset();
        context.first_level_cache().flush();
        outcome
    }

    fn mapping(&self, node: &Node, entity_type: &EntityType) -> Arc<ProxyMapping> {
        let key = (node.node_type().name.clone(), entity_type.clone());
        if let Some(mapping) = self.mappings.read().get(&key) {
            return Arc::clone(mapping);
        }

        let mapping = Arc::new(node.node_type().proxy_mapping(&self.option_key, entity_type));
        self.mappings.write().insert(key, Arc::clone(&mapping));
        mapping
    }
}

impl std::fmt::Debug for PropertyApplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyApplier")
            .field("option_key", &self.option_key)
            .field("mappings", &self.mappings.read().len())
            .finish()
    }
}
