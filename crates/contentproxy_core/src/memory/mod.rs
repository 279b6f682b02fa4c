//! In-memory backends for the entity store, the content repository and type
//! metadata.

mod content_repository;
mod entity_store;

pub use content_repository::MemoryContentRepository;
pub use entity_store::MemoryEntityStore;

use crate::dataset::Dataset;
use crate::error::CoreResult;
use crate::metadata::StaticMetadata;
use std::sync::Arc;

/// The three in-memory backends seeded from one dataset.
#[derive(Debug, Clone)]
pub struct MemoryBackends {
    /// Entity type metadata.
    pub metadata: Arc<StaticMetadata>,
    /// Entity store.
    pub entities: Arc<MemoryEntityStore>,
    /// Content repository.
    pub content: Arc<MemoryContentRepository>,
}

impl MemoryBackends {
    /// Validates `dataset` and seeds fresh backends from it.
    pub fn from_dataset(dataset: Dataset) -> CoreResult<Self> {
        dataset.validate()?;

        let entities = MemoryEntityStore::new();
        for entity in dataset.entities {
            entities.insert(entity);
        }

        let content = MemoryContentRepository::new();
        for node_type in dataset.node_types {
            content.register_node_type(node_type);
        }
        for node in dataset.nodes {
            content.insert(node);
        }

        Ok(Self {
            metadata: Arc::new(StaticMetadata::new(dataset.types)),
            entities: Arc::new(entities),
            content: Arc::new(content),
        })
    }

    /// Captures the committed state of all backends.
    pub fn snapshot(&self) -> Dataset {
        Dataset {
            types: self.metadata.declarations().to_vec(),
            entities: self.entities.entities(),
            node_types: self.content.node_types(),
            nodes: self.content.records(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::DynamicEntity;
    use crate::metadata::{MetadataProvider, TypeDeclaration};
    use crate::node::{NodeData, NodeType};
    use crate::types::EntityType;

    #[test]
    fn seed_and_snapshot() {
        let dataset = Dataset {
            types: vec![TypeDeclaration::proxyable_entity("Acme.Shop:Product")],
            entities: vec![
                DynamicEntity::new("Acme.Shop:Product", "p-1").with_property("title", "Chair"),
            ],
            node_types: vec![NodeType::new("Acme.Shop:ProductPage")],
            nodes: vec![NodeData::new(
                "n-1",
                "/sites/shop/chair",
                "live",
                "Acme.Shop:ProductPage",
            )],
        };

        let backends = MemoryBackends::from_dataset(dataset.clone()).unwrap();
        assert_eq!(
            backends.metadata.implementors_of(crate::metadata::PROXYABLE_CAPABILITY),
            vec![EntityType::from("Acme.Shop:Product")]
        );
        assert_eq!(backends.entities.flush_count(), 0);
        assert_eq!(backends.snapshot(), dataset);
    }

    #[test]
    fn invalid_dataset_is_rejected() {
        let dataset = Dataset {
            nodes: vec![NodeData::new("n-1", "/x", "live", "Undeclared")],
            ..Dataset::default()
        };
        assert!(MemoryBackends::from_dataset(dataset).is_err());
    }
}
