//! POSIX kill primitives.
//!
//! SIGTERM for the graceful request, `kill(pid, 0)` for the liveness
//! probe, SIGKILL for the escalation.

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::debug;

use crate::error::{Error, Result};

pub(crate) fn request_graceful(pid: u32) -> Result<()> {
    debug!(pid = pid, "sending SIGTERM");
    match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        Ok(()) => Ok(()),
        Err(Errno::ESRCH) => Err(Error::TargetNotFound(pid)),
        Err(Errno::EPERM) => Err(Error::PermissionDenied(pid)),
        Err(e) => Err(Error::KillFailed {
            pid,
            reason: e.to_string(),
        }),
    }
}

pub(crate) fn force_kill(pid: u32) -> Result<()> {
    debug!(pid = pid, "sending SIGKILL");
    match kill(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        // already gone counts as killed
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(Errno::EPERM) => Err(Error::PermissionDenied(pid)),
        Err(e) => Err(Error::KillFailed {
            pid,
            reason: e.to_string(),
        }),
    }
}

/// Whether the target still runs. An unreaped zombie counts as exited:
/// it already ran to completion, its parent just has not collected it.
pub(crate) fn is_alive(pid: u32) -> bool {
    match kill(Pid::from_raw(pid as i32), None) {
        Ok(()) => !is_zombie(pid),
        // the probe bouncing off a foreign process still proves it exists
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

#[cfg(target_os = "linux")]
fn is_zombie(pid: u32) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => stat_state(&stat) == Some('Z'),
        Err(_) => false,
    }
}

#[cfg(not(target_os = "linux"))]
fn is_zombie(_pid: u32) -> bool {
    false
}

/// Extract the state field from a `/proc/<pid>/stat` line. The command
/// name may itself contain spaces and parentheses, so the state is
/// whatever follows the last closing parenthesis.
#[cfg(target_os = "linux")]
fn stat_state(stat: &str) -> Option<char> {
    let rest = &stat[stat.rfind(')')? + 1..];
    rest.split_whitespace().next()?.chars().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_process_is_alive() {
        assert!(is_alive(std::process::id()));
    }

    #[test]
    fn test_absurd_pid_is_not_alive() {
        assert!(!is_alive(999_999_999));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_stat_state_parsing() {
        assert_eq!(stat_state("1234 (cat) R 1 1234 1234"), Some('R'));
        // command names may contain the field separators themselves
        assert_eq!(stat_state("1234 (we) ird (name) Z 1 1234"), Some('Z'));
        assert_eq!(stat_state("garbage"), None);
    }
}
