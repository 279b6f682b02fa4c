//! # Content Proxy Core
//!
//! Data model and storage contracts for mirroring persisted entities into a
//! content tree.
//!
//! This crate provides:
//! - Identifiers, property values and ordered property maps
//! - The [`ProxyableEntity`] capability and the [`EntityStore`] contract
//! - The content tree model: node records, node types, contexts, the
//!   first-level node cache and the node factory
//! - The [`ContentRepository`] contract
//! - Type metadata ([`MetadataProvider`])
//! - In-memory backends and JSON/CBOR dataset snapshots
//!
//! ## Unit of Work
//!
//! Both stores stage writes: `update` registers a change, `persist_all`
//! commits everything registered since the last flush. The entity store
//! notifies [`PersistenceListener`]s after each commit.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod dataset;
mod entity;
mod error;
mod metadata;
pub mod memory;
pub mod node;
mod repository;
mod types;
mod value;

pub use dataset::{Dataset, DatasetFormat};
pub use entity::{DynamicEntity, EntityCursor, EntityStore, PersistenceListener, ProxyableEntity};
pub use error::{CoreError, CoreResult, ListenerError};
pub use metadata::{
    MetadataProvider, StaticMetadata, TypeDeclaration, ENTITY_MARKER, PROXYABLE_CAPABILITY,
};
pub use node::{
    Context, ContextConfig, ContextFactory, FirstLevelNodeCache, Node, NodeData, NodeFactory,
    NodeType, ProxyMapping, LIVE_WORKSPACE, PROXY_MAPPING_OPTION,
};
pub use repository::ContentRepository;
pub use types::{ContentObjectRef, EntityIdentifier, EntityType, NodeIdentifier};
pub use value::{PropertyMap, Value};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
