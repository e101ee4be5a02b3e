//! Platform signal adapters.
//!
//! Translates OS-level termination notifications (POSIX signals,
//! Windows console control events) and plain process exit into a single
//! [`crate::orchestrator::ExitOrchestrator::fire`] call. The install is
//! one-shot per process, driven lazily by the first registration, and
//! snapshots the interception mask at that moment.

#[cfg(unix)]
mod unix;

#[cfg(windows)]
mod windows;

#[cfg(unix)]
use unix as platform;

#[cfg(windows)]
use windows as platform;

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::debug;

use crate::config;
use crate::error::Result;

static INSTALLED: AtomicBool = AtomicBool::new(false);
static INSTALL_LOCK: Mutex<()> = Mutex::new(());

/// Whether the handlers are installed. Once true, the interception mask
/// is frozen.
pub(crate) fn is_installed() -> bool {
    INSTALLED.load(Ordering::SeqCst)
}

/// Install the platform handlers if they are not installed yet.
///
/// A failed install is surfaced to the caller and leaves the adapter
/// uninstalled, so a later registration retries.
pub(crate) fn ensure_installed() -> Result<()> {
    if INSTALLED.load(Ordering::SeqCst) {
        return Ok(());
    }

    let _guard = INSTALL_LOCK.lock();
    if INSTALLED.load(Ordering::SeqCst) {
        return Ok(());
    }

    let mask = config::current_mask();
    platform::install(mask)?;
    INSTALLED.store(true, Ordering::SeqCst);
    debug!(mask = mask.bits(), "termination handlers installed");
    Ok(())
}
