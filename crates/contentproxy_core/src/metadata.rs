//! Type metadata: which entity types implement which capabilities.

use crate::types::EntityType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Capability implemented by entity types that content nodes may mirror.
pub const PROXYABLE_CAPABILITY: &str = "ContentProxyableEntity";

/// Marker carried by types that are persisted entities.
pub const ENTITY_MARKER: &str = "Entity";

/// Source of type metadata.
///
/// Answers are expected to be stable for the lifetime of the process.
pub trait MetadataProvider: Send + Sync {
    /// Lists all types implementing `capability`.
    fn implementors_of(&self, capability: &str) -> Vec<EntityType>;

    /// Returns true if `entity_type` carries `marker`.
    fn has_marker(&self, entity_type: &EntityType, marker: &str) -> bool;
}

/// Declaration of one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    /// Type name.
    pub name: EntityType,
    /// Capabilities the type implements.
    #[serde(default)]
    pub capabilities: BTreeSet<String>,
    /// Markers the type carries.
    #[serde(default)]
    pub markers: BTreeSet<String>,
}

impl TypeDeclaration {
    /// Creates a declaration without capabilities or markers.
    pub fn new(name: impl Into<EntityType>) -> Self {
        Self {
            name: name.into(),
            capabilities: BTreeSet::new(),
            markers: BTreeSet::new(),
        }
    }

    /// Declares a persisted entity type that content nodes may mirror.
    pub fn proxyable_entity(name: impl Into<EntityType>) -> Self {
        Self::new(name)
            .with_capability(PROXYABLE_CAPABILITY)
            .with_marker(ENTITY_MARKER)
    }

    /// Adds a capability.
    #[must_use]
    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    /// Adds a marker.
    #[must_use]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.markers.insert(marker.into());
        self
    }
}

/// Metadata provider backed by a fixed list of declarations.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadata {
    declarations: Vec<TypeDeclaration>,
}

impl StaticMetadata {
    /// Creates a provider from declarations.
    pub fn new(declarations: Vec<TypeDeclaration>) -> Self {
        Self { declarations }
    }

    /// Returns the declarations.
    pub fn declarations(&self) -> &[TypeDeclaration] {
        &self.declarations
    }

    fn declaration(&self, entity_type: &EntityType) -> Option<&TypeDeclaration> {
        self.declarations.iter().find(|d| &d.name == entity_type)
    }
}

impl MetadataProvider for StaticMetadata {
    fn implementors_of(&self, capability: &str) -> Vec<EntityType> {
        self.declarations
            .iter()
            .filter(|d| d.capabilities.contains(capability))
            .map(|d| d.name.clone())
            .collect()
    }

    fn has_marker(&self, entity_type: &EntityType, marker: &str) -> bool {
        self.declaration(entity_type)
            .is_some_and(|d| d.markers.contains(marker))
    }
}
