//! Entity contracts: the capability a persisted entity exposes to the
//! synchronization engine, and the store that owns entities.

use crate::error::{CoreError, CoreResult, ListenerError};
use crate::types::{ContentObjectRef, EntityIdentifier, EntityType};
use crate::value::{PropertyMap, Value};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Capability contract of an entity that can be mirrored by content nodes.
///
/// Implementations expose an explicit schema instead of relying on runtime
/// introspection: an ordered listing of readable properties, a writability
/// check, and a named write.
pub trait ProxyableEntity: fmt::Debug + Send + Sync {
    /// Returns the runtime type of the entity.
    fn entity_type(&self) -> EntityType;

    /// Lists readable properties in declaration order.
    fn readable_properties(&self) -> PropertyMap;

    /// Returns true if `name` can be written through [`Self::write_property`].
    fn is_property_writable(&self, name: &str) -> bool;

    /// Writes a property value.
    fn write_property(&mut self, name: &str, value: Value) -> CoreResult<()>;

    /// Upcast used by stores to recognise the entity objects they manage.
    fn as_any(&self) -> &dyn Any;
}

/// An entity described by a declared schema: its property map plus the set
/// of property names that are read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicEntity {
    /// Entity type.
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Persistence identifier.
    pub identifier: EntityIdentifier,
    /// Properties in declaration order.
    #[serde(default)]
    pub properties: PropertyMap,
    /// Names of properties without a setter.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub read_only: BTreeSet<String>,
}

impl DynamicEntity {
    /// Creates an entity with no properties.
    pub fn new(
        entity_type: impl Into<EntityType>,
        identifier: impl Into<EntityIdentifier>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            identifier: identifier.into(),
            properties: PropertyMap::new(),
            read_only: BTreeSet::new(),
        }
    }

    /// Adds a writable property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name, value);
        self
    }

    /// Adds a read-only property.
    #[must_use]
    pub fn with_read_only(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        self.read_only.insert(name.clone());
        self.properties.insert(name, value);
        self
    }

    /// Returns the reference a node would use to bind to this entity.
    pub fn reference(&self) -> ContentObjectRef {
        ContentObjectRef::new(self.entity_type.clone(), self.identifier.clone())
    }
}

impl ProxyableEntity for DynamicEntity {
    fn entity_type(&self) -> EntityType {
        self.entity_type.clone()
    }

    fn readable_properties(&self) -> PropertyMap {
        self.properties.clone()
    }

    fn is_property_writable(&self, name: &str) -> bool {
        self.properties.contains(name) && !self.read_only.contains(name)
    }

    fn write_property(&mut self, name: &str, value: Value) -> CoreResult<()> {
        if !self.properties.contains(name) {
            return Err(CoreError::UnknownProperty {
                entity_type: self.entity_type.clone(),
                property: name.to_owned(),
            });
        }
        if self.read_only.contains(name) {
            return Err(CoreError::PropertyNotWritable {
                entity_type: self.entity_type.clone(),
                property: name.to_owned(),
            });
        }
        self.properties.insert(name, value);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Forward-only cursor over the entities of one type.
///
/// Each item is fetched from the store when `next()` is called.
pub type EntityCursor<'a> = Box<dyn Iterator<Item = CoreResult<Box<dyn ProxyableEntity>>> + 'a>;

/// Receives notifications for entities written by a store flush.
pub trait PersistenceListener: Send + Sync {
    /// Called once per entity after a flush committed it.
    fn post_update(&self, entity: &dyn ProxyableEntity) -> Result<(), ListenerError>;
}

/// The external store that owns entities.
///
/// Writes follow a unit-of-work model: [`EntityStore::update`] registers a
/// changed entity, [`EntityStore::persist_all`] commits all registered
/// changes and notifies subscribed listeners.
pub trait EntityStore: Send + Sync {
    /// Opens a lazy cursor over all entities of `entity_type`.
    fn stream_all(&self, entity_type: &EntityType) -> CoreResult<EntityCursor<'_>>;

    /// Returns the persistence identifier of a managed entity.
    fn identifier_of(&self, entity: &dyn ProxyableEntity) -> CoreResult<EntityIdentifier>;

    /// Loads the entity a node refers to.
    fn find(&self, reference: &ContentObjectRef) -> CoreResult<Option<Box<dyn ProxyableEntity>>>;

    /// Registers a changed entity for the next flush.
    fn update(&self, entity: &dyn ProxyableEntity) -> CoreResult<()>;

    /// Commits all registered changes.
    fn persist_all(&self) -> CoreResult<()>;

    /// Subscribes a listener to flush notifications.
    fn subscribe(&self, listener: Arc<dyn PersistenceListener>);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> DynamicEntity {
        DynamicEntity::new("Acme.Shop:Product", "p-1")
            .with_property("title", "Chair")
            .with_property("price", 120)
            .with_read_only("sku", "CH-1")
    }

    #[test]
    fn writability_follows_schema() {
        let entity = product();
        assert!(entity.is_property_writable("title"));
        assert!(!entity.is_property_writable("sku"));
        assert!(!entity.is_property_writable("missing"));
    }

    #[test]
    fn write_property_checks_schema() {
        let mut entity = product();
        entity.write_property("title", Value::from("Table")).unwrap();
        assert_eq!(entity.properties.get("title"), Some(&Value::from("Table")));

        let err = entity.write_property("sku", Value::from("X")).unwrap_err();
        assert!(matches!(err, CoreError::PropertyNotWritable { .. }));

        let err = entity.write_property("color", Value::from("red")).unwrap_err();
        assert!(matches!(err, CoreError::UnknownProperty { .. }));
    }

    #[test]
    fn readable_properties_keep_declaration_order() {
        let names: Vec<_> = product()
            .readable_properties()
            .names()
            .map(str::to_owned)
            .collect();
        assert_eq!(names, vec!["title", "price", "sku"]);
    }

    #[test]
    fn dataset_shape() {
        let json = r#"{"type":"Acme.Shop:Product","identifier":"p-2","properties":{"title":"Lamp"},"read_only":["title"]}"#;
        let entity: DynamicEntity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.identifier.as_str(), "p-2");
        assert!(!entity.is_property_writable("title"));
    }
}
