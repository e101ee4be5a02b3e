//! SafeExit - cleanup callbacks that survive termination signals.
//!
//! The standard exit path only covers a process that ends on its own;
//! a SIGTERM from a supervisor or a closed console window normally
//! skips any cleanup. This library provides:
//! - Registering cleanup callbacks that run exactly once on normal exit
//!   *or* on an intercepted termination signal/console event
//! - A process-wide mask selecting which notifications to intercept
//! - Safe killing of another process (graceful request, bounded wait,
//!   forced kill)
//!
//! # Platform Support
//! - POSIX: SIGINT, SIGTERM, SIGQUIT, SIGHUP; after the callbacks run,
//!   the signal is re-raised with its default disposition
//! - Windows: Ctrl+C/Ctrl+Break, process-local SIGTERM, and the
//!   console close/logoff/shutdown control events
//!
//! # Example
//!
//! ```no_run
//! fn main() -> safe_exit::Result<()> {
//!     let id = safe_exit::register(|| println!("flushing state"))?;
//!
//!     // ... the application runs ...
//!
//!     // no longer needed; later registrations are unaffected
//!     safe_exit::unregister(id);
//!     Ok(())
//! }
//! ```
//!
//! Callbacks run sequentially on the thread that observed the
//! termination; a slow callback delays process death, so keep them
//! short. A callback panic is logged and does not stop the remaining
//! callbacks.

mod adapter;
pub mod config;
pub mod error;
pub mod kill;
mod orchestrator;
mod registry;

// Re-export main types
pub use config::{config, ConfigFlag, CONFIG_CTRL_ALL, DEFAULT_CONFIG};
pub use error::{Error, Result};
pub use kill::{safe_kill, KillOutcome, DEFAULT_GRACE_TIMEOUT};
pub use orchestrator::TerminationNotification;
pub use registry::CallbackId;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Register a cleanup callback to run when the process terminates.
///
/// The first registration installs the platform termination handlers
/// using the mask current at that moment (see [`config`]); an install
/// failure is returned here. Callbacks run in registration order,
/// exactly once per process lifetime, whether the trigger is a normal
/// exit or an intercepted signal/console event.
///
/// Safe to call from any thread. Registering from within a running
/// cleanup callback is accepted but the new callback will not run in
/// that (final) cycle.
pub fn register<F>(callback: F) -> Result<CallbackId>
where
    F: FnOnce() + Send + 'static,
{
    adapter::ensure_installed()?;
    Ok(orchestrator::global().registry().register(Box::new(callback)))
}

/// Remove a previously registered callback.
///
/// Returns whether a callback was removed; unregistering an id twice is
/// a no-op. An unregistered callback is guaranteed not to run.
pub fn unregister(id: CallbackId) -> bool {
    orchestrator::global().registry().unregister(id)
}
