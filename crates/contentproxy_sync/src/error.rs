//! Error types for the synchronization engine.

use contentproxy_core::{CoreError, EntityType, NodeIdentifier};
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during synchronization.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A node handed to the property applier is not bound to an entity.
    #[error("node {node} has no content object")]
    MissingContentObject {
        /// Identifier of the unbound node.
        node: NodeIdentifier,
    },

    /// A type implements the proxyable capability but is not a persisted
    /// entity.
    #[error("type {entity_type} implements the proxyable capability but is not a persisted entity")]
    NotAMirrorableType {
        /// Offending type.
        entity_type: EntityType,
    },

    /// The requested type is not a known mirrorable type.
    #[error("unknown mirrorable type: {entity_type}")]
    UnknownEntityType {
        /// Requested type.
        entity_type: EntityType,
    },

    /// Store or repository failure.
    #[error("storage error: {0}")]
    Core(#[from] CoreError),

    /// A stream observer or progress callback failed.
    #[error("observer failed: {0}")]
    Observer(String),

    /// Sync was cancelled.
    #[error("sync cancelled")]
    Cancelled,
}

impl SyncError {
    /// Creates an observer error.
    pub fn observer(message: impl Into<String>) -> Self {
        Self::Observer(message.into())
    }

    /// Returns true if this error can be retried.
    ///
    /// Only failures of the storage medium qualify; data and configuration
    /// errors repeat on every attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Core(err) => err.is_io(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn retryable_errors() {
        let io = SyncError::from(CoreError::from(io::Error::new(
            io::ErrorKind::TimedOut,
            "store timed out",
        )));
        assert!(io.is_retryable());
        assert!(!SyncError::from(CoreError::invalid_dataset("bad")).is_retryable());
        assert!(!SyncError::Cancelled.is_retryable());
        assert!(!SyncError::observer("callback panicked").is_retryable());
    }

    #[test]
    fn error_display() {
        let err = SyncError::MissingContentObject {
            node: NodeIdentifier::from("n-1"),
        };
        assert_eq!(err.to_string(), "node n-1 has no content object");

        let err = SyncError::NotAMirrorableType {
            entity_type: EntityType::from("Acme.Shop:Draft"),
        };
        assert!(err.to_string().contains("Acme.Shop:Draft"));
    }
}
