//! Safe process killing.
//!
//! `safe_kill` asks the target to terminate gracefully, waits up to a
//! grace timeout for it to exit, and only then escalates to a forced
//! kill:
//! 1. Send the best graceful request for the platform (SIGTERM on
//!    POSIX; WM_CLOSE to the target's window or CTRL_C_EVENT to its
//!    console on Windows).
//! 2. Poll for the target to exit, up to the grace timeout.
//! 3. If it is still alive, force-kill it (SIGKILL / TerminateProcess).

#[cfg(unix)]
mod unix;

#[cfg(windows)]
mod windows;

#[cfg(unix)]
use unix as platform;

#[cfg(windows)]
use windows as platform;

use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::Result;

/// Grace timeout used when the caller has no opinion.
pub const DEFAULT_GRACE_TIMEOUT: Duration = Duration::from_secs(4);

/// Interval between liveness polls while waiting out the grace period.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How a `safe_kill` target ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillOutcome {
    /// The target exited on its own within the grace period.
    TerminatedGracefully,
    /// The target ignored the request and was force-killed.
    Forced,
}

/// Gracefully terminate the target process, escalating after `grace`.
///
/// # Errors
///
/// * [`crate::Error::TargetNotFound`] — the pid does not exist; no
///   forced kill is attempted.
/// * [`crate::Error::PermissionDenied`] — the caller may not signal or
///   terminate the target.
/// * [`crate::Error::ConsoleAttachFailed`] — Windows only: the target
///   has no window and its console could not be attached (the caller
///   may still force-kill on its own).
pub async fn safe_kill(pid: u32, grace: Duration) -> Result<KillOutcome> {
    debug!(pid = pid, grace_ms = grace.as_millis() as u64, "safe kill requested");

    platform::request_graceful(pid)?;

    let deadline = Instant::now() + grace;
    while Instant::now() < deadline {
        if !platform::is_alive(pid) {
            debug!(pid = pid, "target exited within the grace period");
            return Ok(KillOutcome::TerminatedGracefully);
        }
        sleep(POLL_INTERVAL).await;
    }

    if !platform::is_alive(pid) {
        debug!(pid = pid, "target exited at the end of the grace period");
        return Ok(KillOutcome::TerminatedGracefully);
    }

    warn!(pid = pid, "grace period expired, escalating to forced kill");
    platform::force_kill(pid)?;
    Ok(KillOutcome::Forced)
}
