//! CLI command implementations.

pub mod sync;
pub mod types;

use contentproxy_core::memory::{MemoryBackends, MemoryContentRepository, MemoryEntityStore};
use contentproxy_core::Dataset;
use contentproxy_sync::{SyncConfig, SyncEngine};
use std::path::Path;
use std::sync::Arc;

/// Engine over the in-memory backends.
pub type MemoryEngine = SyncEngine<MemoryEntityStore, MemoryContentRepository>;

/// Loads a dataset file into fresh in-memory backends.
pub fn load_backends(path: &Path) -> Result<MemoryBackends, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No dataset found at {:?}", path).into());
    }
    Ok(MemoryBackends::from_dataset(Dataset::load(path)?)?)
}

/// Creates an engine over `backends`, subscribed to entity flushes.
pub fn open_engine(
    backends: &MemoryBackends,
) -> Result<Arc<MemoryEngine>, Box<dyn std::error::Error>> {
    let engine = Arc::new(SyncEngine::new(
        SyncConfig::default(),
        backends.metadata.as_ref(),
        Arc::clone(&backends.entities),
        Arc::clone(&backends.content),
    )?);
    engine.subscribe_to_store();
    Ok(engine)
}
