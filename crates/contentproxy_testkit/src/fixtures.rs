//! Test fixtures and engine helpers.
//!
//! Provides a builder for in-memory backends and convenience functions
//! for wiring a synchronization engine over them.

use contentproxy_core::memory::{MemoryBackends, MemoryContentRepository, MemoryEntityStore};
use contentproxy_core::{
    Context, Dataset, DynamicEntity, Node, NodeData, NodeType, TypeDeclaration, LIVE_WORKSPACE,
};
use contentproxy_sync::{SyncConfig, SyncEngine};
use std::sync::Arc;

/// Engine over the in-memory backends.
pub type TestEngine = SyncEngine<MemoryEntityStore, MemoryContentRepository>;

/// Builder for in-memory backends.
#[derive(Debug, Default)]
pub struct TestBackends {
    dataset: Dataset,
}

impl TestBackends {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a mirrorable entity type.
    #[must_use]
    pub fn proxyable(mut self, entity_type: &str) -> Self {
        self.dataset
            .types
            .push(TypeDeclaration::proxyable_entity(entity_type));
        self
    }

    /// Declares an arbitrary type.
    #[must_use]
    pub fn declare(mut self, declaration: TypeDeclaration) -> Self {
        self.dataset.types.push(declaration);
        self
    }

    /// Adds an entity.
    #[must_use]
    pub fn entity(mut self, entity: DynamicEntity) -> Self {
        self.dataset.entities.push(entity);
        self
    }

    /// Registers a node type.
    #[must_use]
    pub fn node_type(mut self, node_type: NodeType) -> Self {
        self.dataset.node_types.push(node_type);
        self
    }

    /// Adds a node record.
    #[must_use]
    pub fn node(mut self, node: NodeData) -> Self {
        self.dataset.nodes.push(node);
        self
    }

    /// Returns the dataset assembled so far.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Builds the backends.
    ///
    /// # Panics
    ///
    /// Panics if the assembled dataset is inconsistent.
    pub fn build(self) -> MemoryBackends {
        MemoryBackends::from_dataset(self.dataset).expect("Failed to build test backends")
    }
}

/// Creates an engine over `backends` with the default configuration,
/// subscribed to entity flushes.
pub fn test_engine(backends: &MemoryBackends) -> Arc<TestEngine> {
    test_engine_with_config(backends, SyncConfig::default())
}

/// Creates an engine over `backends` with `config`, subscribed to entity
/// flushes.
pub fn test_engine_with_config(backends: &MemoryBackends, config: SyncConfig) -> Arc<TestEngine> {
    let engine = Arc::new(
        SyncEngine::new(
            config,
            backends.metadata.as_ref(),
            Arc::clone(&backends.entities),
            Arc::clone(&backends.content),
        )
        .expect("Failed to create engine"),
    );
    engine.subscribe_to_store();
    engine
}

/// Materialises the committed node `identifier` in the live workspace
/// under `context`.
pub fn live_node(engine: &TestEngine, identifier: &str, context: &Context) -> Arc<Node> {
    let data = engine
        .repository()
        .get(&identifier.into(), LIVE_WORKSPACE)
        .expect("Node not found");
    engine
        .node_factory()
        .create_from_node_data(data, context)
        .expect("Failed to create node")
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use contentproxy_core::ContentObjectRef;

    /// Entity type used by the catalog scenarios.
    pub const PRODUCT: &str = "Acme.Shop:Product";

    /// Node type used by the catalog scenarios.
    pub const PRODUCT_PAGE: &str = "Acme.Shop:ProductPage";

    /// Builder with `count` products, each bound to one live page whose
    /// title is stale.
    pub fn product_catalog_builder(count: usize) -> TestBackends {
        let mut builder = TestBackends::new()
            .proxyable(PRODUCT)
            .node_type(NodeType::new(PRODUCT_PAGE).with_label_property("title"));

        for i in 0..count {
            let entity_id = format!("p-{}", i);
            let price = i as i64 * 10;
            builder = builder
                .entity(
                    DynamicEntity::new(PRODUCT, entity_id.as_str())
                        .with_property("title", format!("Product {}", i))
                        .with_property("price", price),
                )
                .node(
                    NodeData::new(
                        format!("n-{}", i),
                        format!("/sites/shop/product-{}", i),
                        LIVE_WORKSPACE,
                        PRODUCT_PAGE,
                    )
                    .with_property("title", format!("Draft {}", i))
                    .with_property("price", price)
                    .with_content_object(ContentObjectRef::new(PRODUCT, entity_id)),
                );
        }
        builder
    }

    /// Backends with `count` products, see [`product_catalog_builder`].
    pub fn product_catalog(count: usize) -> MemoryBackends {
        product_catalog_builder(count).build()
    }
}
