//! Ordered, thread-safe cleanup callback registry.
//!
//! Callbacks are stored in registration order and drained exactly once
//! by the exit orchestrator. Draining takes a snapshot under the lock
//! and runs the callbacks outside it, so a callback registering another
//! callback cannot deadlock.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// A registered cleanup callback.
pub type CleanupFn = Box<dyn FnOnce() + Send + 'static>;

/// Opaque ticket identifying one registration.
///
/// Registering the same logical callback twice yields two ids and two
/// invocations; unregistering one of them leaves the other in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(pub(crate) u64);

struct Inner {
    entries: Vec<(CallbackId, CleanupFn)>,
    /// Set once the orchestrator has taken its snapshot. Registrations
    /// after this point are accepted but can never fire.
    closed: bool,
}

/// Insertion-ordered callback collection.
pub struct CallbackRegistry {
    next_id: AtomicU64,
    inner: Mutex<Inner>,
}

impl CallbackRegistry {
    pub const fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            inner: Mutex::new(Inner {
                entries: Vec::new(),
                closed: false,
            }),
        }
    }

    /// Append a callback and return its id.
    pub fn register(&self, callback: CleanupFn) -> CallbackId {
        let id = CallbackId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut inner = self.inner.lock();
        inner.entries.push((id, callback));
        id
    }

    /// Remove the entry with the given id. Returns whether an entry was
    /// removed; unregistering an unknown id is a no-op.
    pub fn unregister(&self, id: CallbackId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.entries.len();
        inner.entries.retain(|(entry_id, _)| *entry_id != id);
        inner.entries.len() != before
    }

    /// Take the current callbacks and close the registry.
    ///
    /// The process is terminating once this is called, so anything
    /// registered afterwards is accepted but never runs: a closed
    /// registry yields nothing.
    pub fn snapshot_for_firing(&self) -> Vec<(CallbackId, CleanupFn)> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Vec::new();
        }
        inner.closed = true;
        std::mem::take(&mut inner.entries)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    fn run_all(snapshot: Vec<(CallbackId, CleanupFn)>) {
        for (_, callback) in snapshot {
            callback();
        }
    }

    #[test]
    fn test_callbacks_keep_registration_order() {
        let registry = CallbackRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for name in ["A", "B", "C"] {
            let log = Arc::clone(&log);
            registry.register(Box::new(move || log.lock().push(name)));
        }

        run_all(registry.snapshot_for_firing());
        assert_eq!(*log.lock(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_duplicate_registration_runs_twice() {
        let registry = CallbackRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let counter = Arc::clone(&counter);
            registry.register(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }

        run_all(registry.snapshot_for_firing());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unregister_removes_only_matching_entry() {
        let registry = CallbackRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let log_a = Arc::clone(&log);
        let id_a = registry.register(Box::new(move || log_a.lock().push("A")));
        let log_b = Arc::clone(&log);
        registry.register(Box::new(move || log_b.lock().push("B")));

        assert!(registry.unregister(id_a));
        run_all(registry.snapshot_for_firing());
        assert_eq!(*log.lock(), vec!["B"]);
    }

    #[test]
    fn test_unregister_unknown_id_is_noop() {
        let registry = CallbackRegistry::new();
        assert!(!registry.unregister(CallbackId(42)));
    }

    #[test]
    fn test_registration_after_snapshot_never_fires() {
        let registry = CallbackRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));

        assert!(registry.snapshot_for_firing().is_empty());

        let late = Arc::clone(&counter);
        registry.register(Box::new(move || {
            late.fetch_add(1, Ordering::SeqCst);
        }));

        // the registry is closed; a second snapshot must not expose the
        // late registration
        assert!(registry.snapshot_for_firing().is_empty());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_concurrent_registration() {
        let registry = Arc::new(CallbackRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for _ in 0..16 {
                        registry.register(Box::new(|| {}));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.snapshot_for_firing().len(), 8 * 16);
    }
}
