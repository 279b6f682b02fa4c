//! Reverse synchronization: node edits written back to entities, and
//! entity persistence events turned into node passes.

use crate::engine::SyncEngine;
use crate::error::SyncResult;
use crate::report::SyncReport;
use contentproxy_core::{
    ContentRepository, EntityStore, ListenerError, Node, PersistenceListener, ProxyableEntity,
    Value,
};
use std::sync::{Arc, Weak};

impl<S: EntityStore + 'static, R: ContentRepository + 'static> SyncEngine<S, R> {
    /// Writes a changed node property back onto the node's entity.
    ///
    /// Does nothing and returns false when the node is unbound, the entity
    /// is gone, or the entity property is not writable. Otherwise the write,
    /// the update registration and the flush run with synchronization
    /// suppressed, so the resulting persistence event does not start a
    /// node pass.
    pub fn propagate_node_edit(
        &self,
        node: &Node,
        property: &str,
        old_value: Option<&Value>,
        new_value: &Value,
    ) -> SyncResult<bool> {
        let Some(reference) = node.content_object() else {
            return Ok(false);
        };
        let Some(mut entity) = self.store.find(&reference)? else {
            tracing::debug!(
                node = %node.identifier(),
                content_object = %reference,
                "bound entity not found"
            );
            return Ok(false);
        };
        if !entity.is_property_writable(property) {
            tracing::debug!(content_object = %reference, property, "entity property not writable");
            return Ok(false);
        }

        self.guard.run_suppressed(|| -> SyncResult<()> {
            entity.write_property(property, new_value.clone())?;
            self.store.update(entity.as_ref())?;
            self.store.persist_all()?;
            Ok(())
        })?;

        self.stats.write().reverse_edits += 1;
        tracing::info!(
            module = "content-object-proxy",
            action = "entity-property-updated",
            node = %node.identifier(),
            content_object = %reference,
            property,
            previous = ?old_value,
            value = %new_value,
            "entity property updated"
        );
        Ok(true)
    }

    /// Node-side edit: writes the property on the node, flushes the content
    /// repository, then writes the value back to the bound entity.
    ///
    /// Returns whether the entity was written.
    pub fn edit_node_property(
        &self,
        node: &Node,
        property: &str,
        value: Value,
    ) -> SyncResult<bool> {
        let previous = node.set_property(property, value.clone())?;
        self.repository().persist_all()?;
        self.propagate_node_edit(node, property, previous.as_ref(), &value)
    }

    /// Reacts to an entity flushed by the store.
    ///
    /// Ignored while synchronization is suppressed and for types that are
    /// not mirrorable. Otherwise all entities of the type are synchronized
    /// against the live workspace.
    pub fn on_entity_persisted(
        &self,
        entity: &dyn ProxyableEntity,
    ) -> SyncResult<Option<SyncReport>> {
        let entity_type = entity.entity_type();
        if self.guard.is_suppressed() {
            self.stats.write().events_suppressed += 1;
            tracing::debug!(entity_type = %entity_type, "persistence event suppressed");
            return Ok(None);
        }
        if !self.registry.contains(&entity_type) {
            return Ok(None);
        }

        self.stats.write().resyncs_triggered += 1;
        let context = self.create_content_context(&self.config.live_workspace);
        self.synchronize_all(&entity_type, &context, None).map(Some)
    }

    /// Returns a listener forwarding store flush notifications to
    /// [`SyncEngine::on_entity_persisted`].
    ///
    /// The listener holds a weak reference; once the engine is dropped it
    /// ignores events.
    pub fn persistence_listener(self: &Arc<Self>) -> Arc<dyn PersistenceListener> {
        Arc::new(EngineListener {
            engine: Arc::downgrade(self),
        })
    }

    /// Subscribes this engine to the store's flush notifications.
    pub fn subscribe_to_store(self: &Arc<Self>) {
        self.store.subscribe(self.persistence_listener());
    }
}

struct EngineListener<S: EntityStore + 'static, R: ContentRepository + 'static> {
    engine: Weak<SyncEngine<S, R>>,
}

impl<S: EntityStore + 'static, R: ContentRepository + 'static> PersistenceListener
    for EngineListener<S, R>
{
    fn post_update(&self, entity: &dyn ProxyableEntity) -> Result<(), ListenerError> {
        let Some(engine) = self.engine.upgrade() else {
            return Ok(());
        };
        engine
            .on_entity_persisted(entity)
            .map(|_| ())
            .map_err(|err| Box::new(err) as ListenerError)
    }
}
