//! Reentrancy guard suppressing entity-to-node synchronization while node
//! edits are written back to entities.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Nestable suppression counter.
///
/// While suppressed, persistence events raised by the engine's own entity
/// writes must not trigger node synchronization. The counter is owned by
/// one engine; concurrent passes sharing an engine share its state.
#[derive(Debug, Default)]
pub struct SynchronizationGuard {
    depth: AtomicUsize,
}

impl SynchronizationGuard {
    /// Creates an unsuppressed guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while at least one suppressed action is running.
    pub fn is_suppressed(&self) -> bool {
        self.depth.load(Ordering::SeqCst) > 0
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    /// Enters suppression until the returned scope is dropped.
    pub fn enter(&self) -> SuppressionScope<'_> {
        self.depth.fetch_add(1, Ordering::SeqCst);
        SuppressionScope { guard: self }
    }

    /// Runs `action` with synchronization suppressed.
    ///
    /// On `Ok` only the outermost call returns the guard to unsuppressed.
    /// On `Err` or panic suppression is cleared at once, at every nesting
    /// level, and the failure is passed through unchanged.
    pub fn run_suppressed<T, E>(&self, action: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        let was_suppressed = self.is_suppressed();
        let scope = self.enter();
        let outcome = panic::catch_unwind(AssertUnwindSafe(action));
        drop(scope);

        match outcome {
            Ok(Ok(value)) => {
                tracing::trace!(
                    was_suppressed,
                    depth = self.depth(),
                    "suppressed action completed"
                );
                Ok(value)
            }
            Ok(Err(err)) => {
                self.clear();
                Err(err)
            }
            Err(payload) => {
                self.clear();
                panic::resume_unwind(payload)
            }
        }
    }

    fn clear(&self) {
        self.depth.store(0, Ordering::SeqCst);
    }
}

/// Scope of one suppression level. Leaves the level on drop.
#[must_use = "suppression ends when the scope is dropped"]
#[derive(Debug)]
pub struct SuppressionScope<'a> {
    guard: &'a SynchronizationGuard,
}

impl Drop for SuppressionScope<'_> {
    fn drop(&mut self) {
        // Saturating: an inner failure may already have cleared the depth.
        let _ = self
            .guard
            .depth
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |depth| {
                Some(depth.saturating_sub(1))
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsuppressed_by_default() {
        let guard = SynchronizationGuard::new();
        assert!(!guard.is_suppressed());
    }

    #[test]
    fn suppressed_inside_action() {
        let guard = SynchronizationGuard::new();
        let seen: Result<bool, ()> = guard.run_suppressed(|| Ok(guard.is_suppressed()));
        assert_eq!(seen, Ok(true));
        assert!(!guard.is_suppressed());
    }

    #[test]
    fn nesting_only_outermost_releases() {
        let guard = SynchronizationGuard::new();
        let result: Result<(), ()> = guard.run_suppressed(|| {
            guard.run_suppressed(|| {
                assert_eq!(guard.depth(), 2);
                Ok(())
            })?;
            assert!(guard.is_suppressed());
            Ok(())
        });
        assert!(result.is_ok());
        assert!(!guard.is_suppressed());
        assert_eq!(guard.depth(), 0);
    }

    #[test]
    fn inner_failure_clears_immediately() {
        let guard = SynchronizationGuard::new();
        let result: Result<(), &str> = guard.run_suppressed(|| {
            let inner: Result<(), &str> = guard.run_suppressed(|| Err("boom"));
            assert_eq!(inner, Err("boom"));
            assert!(!guard.is_suppressed());
            Ok(())
        });
        assert!(result.is_ok());
        assert!(!guard.is_suppressed());
    }

    #[test]
    fn failure_is_passed_through() {
        let guard = SynchronizationGuard::new();
        let result: Result<(), String> = guard.run_suppressed(|| Err("store offline".to_owned()));
        assert_eq!(result, Err("store offline".to_owned()));
        assert!(!guard.is_suppressed());
    }

    #[test]
    fn panic_releases_and_resumes() {
        let guard = SynchronizationGuard::new();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let _: Result<(), ()> = guard.run_suppressed(|| panic!("listener exploded"));
        }));
        assert!(outcome.is_err());
        assert!(!guard.is_suppressed());
    }

    #[test]
    fn scope_releases_on_drop() {
        let guard = SynchronizationGuard::new();
        {
            let _outer = guard.enter();
            let _inner = guard.enter();
            assert_eq!(guard.depth(), 2);
        }
        assert_eq!(guard.depth(), 0);
    }
}
