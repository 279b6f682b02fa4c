//! Discovery of mirrorable entity types.

use crate::error::{SyncError, SyncResult};
use contentproxy_core::{EntityType, MetadataProvider, ENTITY_MARKER, PROXYABLE_CAPABILITY};

/// The set of entity types content nodes may mirror.
///
/// Built once from metadata and immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    types: Vec<EntityType>,
}

impl CapabilityRegistry {
    /// Discovers all types implementing the proxyable capability.
    ///
    /// Every discovered type must carry the persisted entity marker;
    /// otherwise discovery fails with [`SyncError::NotAMirrorableType`].
    pub fn discover(metadata: &dyn MetadataProvider) -> SyncResult<Self> {
        Self::discover_capability(metadata, PROXYABLE_CAPABILITY)
    }

    /// Discovers all types implementing `capability`.
    pub fn discover_capability(
        metadata: &dyn MetadataProvider,
        capability: &str,
    ) -> SyncResult<Self> {
        let mut types = Vec::new();
        for entity_type in metadata.implementors_of(capability) {
            if !metadata.has_marker(&entity_type, ENTITY_MARKER) {
                return Err(SyncError::NotAMirrorableType { entity_type });
            }
            if !types.contains(&entity_type) {
                types.push(entity_type);
            }
        }
        tracing::debug!(capability, count = types.len(), "discovered mirrorable types");
        Ok(Self { types })
    }

    /// Returns the discovered types in discovery order.
    pub fn types(&self) -> &[EntityType] {
        &self.types
    }

    /// Returns true if `entity_type` is mirrorable.
    pub fn contains(&self, entity_type: &EntityType) -> bool {
        self.types.contains(entity_type)
    }

    /// Number of mirrorable types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no type is mirrorable.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentproxy_core::{StaticMetadata, TypeDeclaration};

    #[test]
    fn discovers_proxyable_entities() {
        let metadata = StaticMetadata::new(vec![
            TypeDeclaration::proxyable_entity("Acme.Shop:Product"),
            TypeDeclaration::new("Acme.Shop:Order").with_marker(ENTITY_MARKER),
            TypeDeclaration::proxyable_entity("Acme.Shop:Brand"),
        ]);

        let registry = CapabilityRegistry::discover(&metadata).unwrap();
        assert_eq!(
            registry.types(),
            &[EntityType::from("Acme.Shop:Product"), EntityType::from("Acme.Shop:Brand")]
        );
        assert!(registry.contains(&"Acme.Shop:Brand".into()));
        assert!(!registry.contains(&"Acme.Shop:Order".into()));
    }

    #[test]
    fn rejects_capability_without_entity_marker() {
        let metadata = StaticMetadata::new(vec![
            TypeDeclaration::proxyable_entity("Acme.Shop:Product"),
            TypeDeclaration::new("Acme.Shop:Draft").with_capability(PROXYABLE_CAPABILITY),
        ]);

        let err = CapabilityRegistry::discover(&metadata).unwrap_err();
        assert!(matches!(
            err,
            SyncError::NotAMirrorableType { ref entity_type }
                if entity_type.as_str() == "Acme.Shop:Draft"
        ));
    }

    #[test]
    fn empty_metadata_yields_empty_registry() {
        let registry = CapabilityRegistry::discover(&StaticMetadata::default()).unwrap();
        assert!(registry.is_empty());
    }
}
