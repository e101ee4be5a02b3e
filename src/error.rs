//! Error types for the safe-exit library.

use thiserror::Error;

/// Result type alias for safe-exit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while installing termination handlers or killing
/// another process.
#[derive(Error, Debug)]
pub enum Error {
    /// The target process does not exist.
    #[error("Process with PID {0} not found")]
    TargetNotFound(u32),

    /// The caller is not allowed to signal or terminate the target.
    #[error("Permission denied to signal process {0}")]
    PermissionDenied(u32),

    /// Attaching to the target's console failed (Windows only).
    ///
    /// A process can only attach to one console at a time, so this is
    /// expected when the caller already owns a different console. The
    /// caller may still fall back to a forced kill.
    #[error("Failed to attach to the console of process {pid}: {reason}")]
    ConsoleAttachFailed { pid: u32, reason: String },

    /// Sending the termination request or the forced kill failed.
    #[error("Failed to kill process {pid}: {reason}")]
    KillFailed { pid: u32, reason: String },

    /// Installing the process-wide termination handlers failed.
    ///
    /// Surfaced by the first `register` call; silently skipping the
    /// install would break the cleanup guarantee.
    #[error("Failed to install termination handlers: {0}")]
    Install(#[source] std::io::Error),
}
