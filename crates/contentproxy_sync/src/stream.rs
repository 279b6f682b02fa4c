//! Lazy, single-pass traversal of all entities of one type.

use crate::error::{SyncError, SyncResult};
use contentproxy_core::{EntityCursor, ProxyableEntity};
use std::sync::Arc;

/// Observer invoked with each entity and its zero-based position after the
/// consumer is done with the entity.
pub type StreamObserver<'a> = Box<dyn FnMut(&dyn ProxyableEntity, usize) -> SyncResult<()> + 'a>;

/// Forward-only iterator over a store cursor.
///
/// Items are fetched one at a time; the full result set is never held.
/// The observer for an item runs when the consumer asks for the next one,
/// or when the cursor is exhausted. The first failure, from the store or
/// from the observer, is yielded as `Err` and ends the stream.
pub struct EntityStream<'a> {
    cursor: EntityCursor<'a>,
    observer: Option<StreamObserver<'a>>,
    yielded: Option<Arc<dyn ProxyableEntity>>,
    position: usize,
    finished: bool,
}

impl<'a> EntityStream<'a> {
    /// Wraps a store cursor.
    pub fn new(cursor: EntityCursor<'a>) -> Self {
        Self {
            cursor,
            observer: None,
            yielded: None,
            position: 0,
            finished: false,
        }
    }

    /// Sets the per-item observer.
    pub fn with_observer(
        mut self,
        observer: impl FnMut(&dyn ProxyableEntity, usize) -> SyncResult<()> + 'a,
    ) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Number of entities handed out so far.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl EntityStream<'_> {
    fn observe_yielded(&mut self) -> SyncResult<()> {
        let Some(entity) = self.yielded.take() else {
            return Ok(());
        };
        match self.observer.as_mut() {
            Some(observer) => observer(entity.as_ref(), self.position - 1),
            None => Ok(()),
        }
    }
}

impl Iterator for EntityStream<'_> {
    type Item = SyncResult<Arc<dyn ProxyableEntity>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if let Err(err) = self.observe_yielded() {
            self.finished = true;
            return Some(Err(err));
        }

        let entity: Arc<dyn ProxyableEntity> = match self.cursor.next() {
            None => {
                self.finished = true;
                return None;
            }
            Some(Err(err)) => {
                self.finished = true;
                return Some(Err(SyncError::from(err)));
            }
            Some(Ok(entity)) => Arc::from(entity),
        };

        if self.observer.is_some() {
            self.yielded = Some(Arc::clone(&entity));
        }
        self.position += 1;
        Some(Ok(entity))
    }
}

impl std::fmt::Debug for EntityStream<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStream")
            .field("position", &self.position)
            .field("finished", &self.finished)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentproxy_core::{CoreError, CoreResult, DynamicEntity};
    use std::cell::{Cell, RefCell};

    fn cursor(items: Vec<CoreResult<DynamicEntity>>) -> EntityCursor<'static> {
        Box::new(
            items
                .into_iter()
                .map(|item| item.map(|e| Box::new(e) as Box<dyn ProxyableEntity>)),
        )
    }

    fn product(id: &str) -> CoreResult<DynamicEntity> {
        Ok(DynamicEntity::new("Acme.Shop:Product", id))
    }

    #[test]
    fn observer_sees_every_item_with_index() {
        let mut seen = Vec::new();
        let stream = EntityStream::new(cursor(vec![product("p-1"), product("p-2"), product("p-3")]))
            .with_observer(|entity, index| {
                let dynamic = entity.as_any().downcast_ref::<DynamicEntity>().unwrap();
                seen.push((dynamic.identifier.as_str().to_owned(), index));
                Ok(())
            });

        assert_eq!(stream.count(), 3);
        assert_eq!(
            seen,
            vec![("p-1".to_owned(), 0), ("p-2".to_owned(), 1), ("p-3".to_owned(), 2)]
        );
    }

    #[test]
    fn lazy_until_pulled() {
        let pulled = Cell::new(0);
        let source = (0..1_000_000).map(|i| {
            pulled.set(pulled.get() + 1);
            Ok::<_, CoreError>(Box::new(DynamicEntity::new("Acme.Shop:Product", format!("p-{}", i)))
                as Box<dyn ProxyableEntity>)
        });
        let mut stream = EntityStream::new(Box::new(source));

        assert_eq!(pulled.get(), 0);
        stream.next().unwrap().unwrap();
        stream.next().unwrap().unwrap();
        assert_eq!(pulled.get(), 2);
        assert_eq!(stream.position(), 2);
    }

    #[test]
    fn empty_cursor_never_calls_observer() {
        let mut calls = 0;
        let stream = EntityStream::new(cursor(Vec::new())).with_observer(|_, _| {
            calls += 1;
            Ok(())
        });
        assert_eq!(stream.count(), 0);
        assert_eq!(calls, 0);
    }

    #[test]
    fn observer_failure_ends_stream() {
        let items = vec![product("p-1"), product("p-2"), product("p-3")];
        let mut stream = EntityStream::new(cursor(items)).with_observer(|_, index| {
            if index == 1 {
                Err(SyncError::observer("progress sink closed"))
            } else {
                Ok(())
            }
        });

        // Item 1 is handed out before its observer fails.
        assert!(stream.next().unwrap().is_ok());
        assert!(stream.next().unwrap().is_ok());
        assert!(matches!(stream.next(), Some(Err(SyncError::Observer(_)))));
        assert!(stream.next().is_none());
    }

    #[test]
    fn observer_runs_after_consumer() {
        let log = RefCell::new(Vec::new());
        let stream = EntityStream::new(cursor(vec![product("p-1"), product("p-2")]))
            .with_observer(|_, index| {
                log.borrow_mut().push(format!("observed {}", index));
                Ok(())
            });

        for (index, entity) in stream.enumerate() {
            entity.unwrap();
            log.borrow_mut().push(format!("processed {}", index));
        }
        assert_eq!(
            *log.borrow(),
            vec!["processed 0", "observed 0", "processed 1", "observed 1"]
        );
    }

    #[test]
    fn store_failure_ends_stream() {
        let mut stream = EntityStream::new(cursor(vec![
            product("p-1"),
            Err(CoreError::invalid_dataset("corrupt row")),
            product("p-3"),
        ]));

        assert!(stream.next().unwrap().is_ok());
        assert!(matches!(stream.next(), Some(Err(SyncError::Core(_)))));
        assert!(stream.next().is_none());
    }
}
