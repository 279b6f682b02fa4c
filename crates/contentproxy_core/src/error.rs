//! Error types for the content proxy core.

use std::io;
use thiserror::Error;

use crate::types::{EntityIdentifier, EntityType, NodeIdentifier};

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Boxed error raised by a persistence listener.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur in the content model and its backends.
#[derive(Debug, Error)]
pub enum CoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CBOR encoding or decoding failed.
    #[error("CBOR error: {message}")]
    Cbor {
        /// Description of the failure.
        message: String,
    },

    /// Entity not managed by the store.
    #[error("entity not found: {identifier} of type {entity_type}")]
    EntityNotFound {
        /// Type of the entity.
        entity_type: EntityType,
        /// Identifier that was looked up.
        identifier: EntityIdentifier,
    },

    /// The store was handed an entity object it does not manage.
    #[error("entity of type {entity_type} is not managed by this store")]
    UnmanagedEntity {
        /// Type reported by the entity.
        entity_type: EntityType,
    },

    /// Node record not found.
    #[error("node not found: {identifier} in workspace {workspace}")]
    NodeNotFound {
        /// Node identifier.
        identifier: NodeIdentifier,
        /// Workspace that was searched.
        workspace: String,
    },

    /// Node type not declared.
    #[error("node type not found: {name}")]
    NodeTypeNotFound {
        /// Node type name.
        name: String,
    },

    /// Entity property is not declared.
    #[error("unknown property {property} on {entity_type}")]
    UnknownProperty {
        /// Type of the entity.
        entity_type: EntityType,
        /// Property name.
        property: String,
    },

    /// Entity property is declared read-only.
    #[error("property {property} on {entity_type} is not writable")]
    PropertyNotWritable {
        /// Type of the entity.
        entity_type: EntityType,
        /// Property name.
        property: String,
    },

    /// A dataset snapshot is inconsistent.
    #[error("invalid dataset: {message}")]
    InvalidDataset {
        /// Description of the inconsistency.
        message: String,
    },

    /// A persistence listener failed while handling a flush.
    #[error("persistence listener failed: {0}")]
    Listener(#[source] ListenerError),
}

impl CoreError {
    /// Creates a CBOR error.
    pub fn cbor(message: impl Into<String>) -> Self {
        Self::Cbor {
            message: message.into(),
        }
    }

    /// Creates an invalid dataset error.
    pub fn invalid_dataset(message: impl Into<String>) -> Self {
        Self::InvalidDataset {
            message: message.into(),
        }
    }

    /// Returns true for failures of the underlying medium rather than of the data.
    pub fn is_io(&self) -> bool {
        matches!(self, CoreError::Io(_))
    }
}
