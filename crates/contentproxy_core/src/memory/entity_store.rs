//! In-memory entity store.

use crate::entity::{DynamicEntity, EntityCursor, EntityStore, PersistenceListener, ProxyableEntity};
use crate::error::{CoreError, CoreResult};
use crate::types::{ContentObjectRef, EntityIdentifier, EntityType};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// An entity store holding [`DynamicEntity`] records in memory.
///
/// - Cursors read one record per `next()` and never copy a whole type
/// - Changes are staged by `update` and committed by `persist_all`
/// - Listeners are notified after the commit, with no lock held, so they
///   may read from and write to the store
#[derive(Default)]
pub struct MemoryEntityStore {
    records: RwLock<BTreeMap<EntityType, Vec<DynamicEntity>>>,
    staged: Mutex<Vec<DynamicEntity>>,
    listeners: RwLock<Vec<Arc<dyn PersistenceListener>>>,
    flushes: AtomicU64,
}

impl MemoryEntityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an entity directly, replacing one with the same identifier.
    /// No listener is notified.
    pub fn insert(&self, entity: DynamicEntity) {
        let mut records = self.records.write();
        let entities = records.entry(entity.entity_type.clone()).or_default();
        match entities
            .iter_mut()
            .find(|e| e.identifier == entity.identifier)
        {
            Some(slot) => *slot = entity,
            None => entities.push(entity),
        }
    }

    /// Reads a committed entity.
    pub fn get(&self, reference: &ContentObjectRef) -> Option<DynamicEntity> {
        self.records
            .read()
            .get(&reference.entity_type)?
            .iter()
            .find(|e| e.identifier == reference.identifier)
            .cloned()
    }

    /// All committed entities, grouped by type.
    pub fn entities(&self) -> Vec<DynamicEntity> {
        self.records.read().values().flatten().cloned().collect()
    }

    /// Number of `persist_all` calls so far.
    pub fn flush_count(&self) -> u64 {
        self.flushes.load(Ordering::SeqCst)
    }

    fn managed<'a>(&self, entity: &'a dyn ProxyableEntity) -> CoreResult<&'a DynamicEntity> {
        let dynamic = entity
            .as_any()
            .downcast_ref::<DynamicEntity>()
            .ok_or_else(|| CoreError::UnmanagedEntity {
                entity_type: entity.entity_type(),
            })?;
        if self.get(&dynamic.reference()).is_none() {
            return Err(CoreError::EntityNotFound {
                entity_type: dynamic.entity_type.clone(),
                identifier: dynamic.identifier.clone(),
            });
        }
        Ok(dynamic)
    }
}

impl std::fmt::Debug for MemoryEntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEntityStore")
            .field("types", &self.records.read().len())
            .field("listeners", &self.listeners.read().len())
            .field("flushes", &self.flush_count())
            .finish()
    }
}

/// Cursor reading one record per step.
struct MemoryCursor<'a> {
    store: &'a MemoryEntityStore,
    entity_type: EntityType,
    position: usize,
}

impl Iterator for MemoryCursor<'_> {
    type Item = CoreResult<Box<dyn ProxyableEntity>>;

    fn next(&mut self) -> Option<Self::Item> {
        let entity = {
            let records = self.store.records.read();
            records.get(&self.entity_type)?.get(self.position)?.clone()
        };
        self.position += 1;
        Some(Ok(Box::new(entity)))
    }
}

impl EntityStore for MemoryEntityStore {
    fn stream_all(&self, entity_type: &EntityType) -> CoreResult<EntityCursor<'_>> {
        Ok(Box::new(MemoryCursor {
            store: self,
            entity_type: entity_type.clone(),
            position: 0,
        }))
    }

    fn identifier_of(&self, entity: &dyn ProxyableEntity) -> CoreResult<EntityIdentifier> {
        Ok(self.managed(entity)?.identifier.clone())
    }

    fn find(&self, reference: &ContentObjectRef) -> CoreResult<Option<Box<dyn ProxyableEntity>>> {
        Ok(self
            .get(reference)
            .map(|e| Box::new(e) as Box<dyn ProxyableEntity>))
    }

    fn update(&self, entity: &dyn ProxyableEntity) -> CoreResult<()> {
        let dynamic = self.managed(entity)?.clone();
        let mut staged = self.staged.lock();
        match staged
            .iter_mut()
            .find(|e| e.entity_type == dynamic.entity_type && e.identifier == dynamic.identifier)
        {
            Some(slot) => *slot = dynamic,
            None => staged.push(dynamic),
        }
        Ok(())
    }

    fn persist_all(&self) -> CoreResult<()> {
        let staged = std::mem::take(&mut *self.staged.lock());
        for entity in &staged {
            self.insert(entity.clone());
        }
        self.flushes.fetch_add(1, Ordering::SeqCst);

        let listeners = self.listeners.read().clone();
        for entity in &staged {
            for listener in &listeners {
                listener.post_update(entity).map_err(CoreError::Listener)?;
            }
        }
        Ok(())
    }

    fn subscribe(&self, listener: Arc<dyn PersistenceListener>) {
        self.listeners.write().push(listener);
    }
}
