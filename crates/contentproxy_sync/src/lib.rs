//! # Content Proxy Sync
//!
//! Bidirectional synchronization between persisted entities and the content
//! nodes that mirror them.
//!
//! This crate provides:
//! - Discovery of mirrorable entity types
//! - Lazy streaming of all entities of a type
//! - Lookup of the nodes bound to an entity under a context
//! - Property diffing with per node type renames
//! - A nestable reentrancy guard
//! - Bulk passes and reverse hooks on one [`SyncEngine`]
//!
//! ## Directions
//!
//! Entity to node: [`SyncEngine::synchronize_all`] walks every entity of a
//! type and writes differing property values onto each bound node. Entity
//! persistence events reach [`SyncEngine::on_entity_persisted`], which runs
//! such a pass against the live workspace.
//!
//! Node to entity: [`SyncEngine::propagate_node_edit`] writes one edited
//! node property back onto the bound entity.
//!
//! ## Key Invariants
//!
//! - Only property values change; nodes and entities are never created,
//!   moved or deleted
//! - A node property is written only if the node defines it and its value
//!   differs strictly
//! - Entity writes made on behalf of a node edit never start a node pass
//! - The guard is back in its prior state after every call, successful or not

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod applier;
mod config;
mod engine;
mod error;
mod guard;
mod hooks;
mod locator;
mod registry;
mod report;
mod stream;

pub use applier::PropertyApplier;
pub use config::SyncConfig;
pub use engine::{NodeCallback, SyncEngine};
pub use error::{SyncError, SyncResult};
pub use guard::{SuppressionScope, SynchronizationGuard};
pub use locator::NodeLocator;
pub use registry::CapabilityRegistry;
pub use report::{EntitySummary, SyncReport, SyncStats};
pub use stream::{EntityStream, StreamObserver};
