//! Interception mask configuration.
//!
//! A process-wide bitmask controls which termination notifications the
//! platform adapter intercepts. The mask is read once, when the handlers
//! are installed (lazily, on the first [`crate::register`] call);
//! changing it afterwards has no effect on already-installed handlers.

use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::warn;

/// One bit per interceptable termination notification.
///
/// POSIX-only and Windows-only flags are accepted on every platform;
/// flags that are not meaningful on the current platform are ignored at
/// install time rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigFlag(u32);

impl ConfigFlag {
    /// Empty mask; only plain process exit triggers the callbacks.
    pub const NONE: ConfigFlag = ConfigFlag(0);

    /// Intercept SIGINT (Ctrl+C).
    pub const SIGINT: ConfigFlag = ConfigFlag(1 << 0);
    /// Intercept SIGTERM. On Windows this signal is process-local only;
    /// it cannot be sent across processes.
    pub const SIGTERM: ConfigFlag = ConfigFlag(1 << 1);
    /// Intercept SIGQUIT (POSIX only).
    pub const SIGQUIT: ConfigFlag = ConfigFlag(1 << 2);
    /// Intercept SIGHUP (POSIX only).
    pub const SIGHUP: ConfigFlag = ConfigFlag(1 << 3);
    /// Intercept SIGBREAK (Windows only).
    pub const SIGBREAK: ConfigFlag = ConfigFlag(1 << 4);

    /// Intercept the console-close control event (Windows only).
    pub const CTRL_CLOSE_EVENT: ConfigFlag = ConfigFlag(1 << 5);
    /// Intercept the logoff control event (Windows only, service
    /// processes; interactive processes never receive it).
    pub const CTRL_LOGOFF_EVENT: ConfigFlag = ConfigFlag(1 << 6);
    /// Intercept the system-shutdown control event (Windows only,
    /// service processes).
    pub const CTRL_SHUTDOWN_EVENT: ConfigFlag = ConfigFlag(1 << 7);

    /// Allocate a hidden console when the process has none, so console
    /// control events have something to attach to (Windows only).
    /// Opt-in: allocating a console is a visible side effect.
    pub const AUTO_CREATE_CONSOLE: ConfigFlag = ConfigFlag(1 << 8);
    /// Hide the console window even when the process did not allocate
    /// it (Windows only).
    pub const FORCE_HIDE_CONSOLE: ConfigFlag = ConfigFlag(1 << 9);

    /// Whether every flag in `other` is set in `self`.
    pub const fn contains(self, other: ConfigFlag) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any flag in `other` is set in `self`.
    pub const fn intersects(self, other: ConfigFlag) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether no flag is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub(crate) const fn bits(self) -> u32 {
        self.0
    }

    pub(crate) const fn from_bits(bits: u32) -> ConfigFlag {
        ConfigFlag(bits)
    }
}

impl BitOr for ConfigFlag {
    type Output = ConfigFlag;

    fn bitor(self, rhs: ConfigFlag) -> ConfigFlag {
        ConfigFlag(self.0 | rhs.0)
    }
}

impl BitOrAssign for ConfigFlag {
    fn bitor_assign(&mut self, rhs: ConfigFlag) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ConfigFlag {
    type Output = ConfigFlag;

    fn bitand(self, rhs: ConfigFlag) -> ConfigFlag {
        ConfigFlag(self.0 & rhs.0)
    }
}

/// All Windows console control events.
pub const CONFIG_CTRL_ALL: ConfigFlag = ConfigFlag(
    ConfigFlag::CTRL_CLOSE_EVENT.0 | ConfigFlag::CTRL_LOGOFF_EVENT.0 | ConfigFlag::CTRL_SHUTDOWN_EVENT.0,
);

/// Default mask: every platform-appropriate termination notification.
///
/// The console-allocation flags are excluded; creating or hiding a
/// console window is a visible side effect and must be opted into.
pub const DEFAULT_CONFIG: ConfigFlag = ConfigFlag(
    ConfigFlag::SIGINT.0
        | ConfigFlag::SIGTERM.0
        | ConfigFlag::SIGQUIT.0
        | ConfigFlag::SIGHUP.0
        | ConfigFlag::SIGBREAK.0
        | CONFIG_CTRL_ALL.0,
);

static MASK: AtomicU32 = AtomicU32::new(DEFAULT_CONFIG.0);

/// Set the process-wide interception mask.
///
/// Takes effect only if called before the first [`crate::register`]
/// call, which installs the handlers with the mask current at that
/// moment. Calling it afterwards is a no-op (a warning is logged).
pub fn config(flags: ConfigFlag) {
    if crate::adapter::is_installed() {
        warn!(
            mask = flags.bits(),
            "config() called after termination handlers were installed; ignored"
        );
        return;
    }
    MASK.store(flags.bits(), Ordering::SeqCst);
}

/// The mask the next install will use.
pub(crate) fn current_mask() -> ConfigFlag {
    ConfigFlag::from_bits(MASK.load(Ordering::SeqCst))
}
