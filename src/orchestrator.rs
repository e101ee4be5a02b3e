//! Single-shot exit orchestration.
//!
//! Whatever ends the process first — a translated signal, a console
//! control event or plain process exit — funnels into [`ExitOrchestrator::fire`],
//! which drains the callback registry at most once for the lifetime of
//! the process. Later notifications are absorbed.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};

use tracing::{debug, error, info};

use crate::registry::CallbackRegistry;

/// The termination cause, carrying what the platform adapter needs to
/// re-deliver the termination after the callbacks have run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationNotification {
    /// The process is exiting normally; no re-delivery is needed.
    NormalExit,
    /// An intercepted signal (POSIX, or a CRT-translated signal on
    /// Windows). The signal is re-raised with its default disposition
    /// after the callbacks have run.
    Signal(i32),
    /// A Windows console control event (close, logoff, shutdown).
    ConsoleEvent(u32),
    /// A WM_CLOSE delivered to the process window (Windows).
    WindowClose,
}

const IDLE: u8 = 0;
const FIRING: u8 = 1;
const DONE: u8 = 2;

/// Idempotent dispatcher draining the registry exactly once.
pub struct ExitOrchestrator {
    state: AtomicU8,
    registry: CallbackRegistry,
}

impl ExitOrchestrator {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(IDLE),
            registry: CallbackRegistry::new(),
        }
    }

    pub fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    /// Run all registered callbacks in registration order.
    ///
    /// Returns `true` if this call performed the drain. Any later call
    /// — a second signal during a slow callback, a signal racing plain
    /// exit — returns `false` without running anything.
    ///
    /// A callback panic is caught and logged; the remaining callbacks
    /// still run.
    pub fn fire(&self, notification: TerminationNotification) -> bool {
        if self
            .state
            .compare_exchange(IDLE, FIRING, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!(?notification, "termination already handled, ignoring");
            return false;
        }

        let callbacks = self.registry.snapshot_for_firing();
        info!(
            ?notification,
            count = callbacks.len(),
            "running cleanup callbacks"
        );

        for (id, callback) in callbacks {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(callback)) {
                error!(
                    callback = id.0,
                    reason = panic_message(&panic),
                    "cleanup callback panicked"
                );
            }
        }

        self.state.store(DONE, Ordering::SeqCst);
        debug!("cleanup complete");
        true
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

static EXIT: ExitOrchestrator = ExitOrchestrator::new();

/// The process-wide orchestrator instance.
pub(crate) fn global() -> &'static ExitOrchestrator {
    &EXIT
}
