//! Windows termination adapter.
//!
//! Console control events (close, logoff, shutdown) arrive through a
//! `SetConsoleCtrlHandler` routine on an OS-spawned thread; Ctrl+C and
//! Ctrl+Break flow through the CRT signal translation and are handled
//! as SIGINT/SIGBREAK. SIGTERM exists only process-locally on Windows
//! (`raise`); it cannot be sent across processes.
//!
//! Logoff and shutdown events are only delivered to service processes,
//! not interactive ones — a platform limitation, not a bug here.

use std::io;
use std::sync::atomic::{AtomicU32, Ordering};

use libc::c_int;
use tracing::{debug, info};

use windows::Win32::Foundation::{BOOL, FALSE, TRUE};
use windows::Win32::System::Console::{
    AllocConsole, GetConsoleWindow, SetConsoleCtrlHandler, CTRL_CLOSE_EVENT, CTRL_LOGOFF_EVENT,
    CTRL_SHUTDOWN_EVENT,
};
use windows::Win32::UI::WindowsAndMessaging::{ShowWindow, SW_HIDE};

use crate::config::{ConfigFlag, CONFIG_CTRL_ALL};
use crate::error::{Error, Result};
use crate::orchestrator::{self, TerminationNotification};

/// Mask snapshotted at install time, read by the control handler.
static INSTALLED_MASK: AtomicU32 = AtomicU32::new(0);

pub(crate) fn install(mask: ConfigFlag) -> Result<()> {
    INSTALLED_MASK.store(mask.bits(), Ordering::SeqCst);

    register_exit_hook()?;
    prepare_console(mask)?;

    unsafe {
        if mask.contains(ConfigFlag::SIGINT) {
            libc::signal(libc::SIGINT, crt_signal_handler as libc::sighandler_t);
        }
        if mask.contains(ConfigFlag::SIGTERM) {
            libc::signal(libc::SIGTERM, crt_signal_handler as libc::sighandler_t);
        }
        if mask.contains(ConfigFlag::SIGBREAK) {
            libc::signal(libc::SIGBREAK, crt_signal_handler as libc::sighandler_t);
        }
    }

    if mask.intersects(CONFIG_CTRL_ALL) {
        unsafe {
            SetConsoleCtrlHandler(Some(console_ctrl_handler), TRUE)
                .map_err(|e| Error::Install(io::Error::new(io::ErrorKind::Other, e)))?;
        }
    }

    Ok(())
}

/// Make sure console control events have a console to attach to.
fn prepare_console(mask: ConfigFlag) -> Result<()> {
    if !mask.intersects(ConfigFlag::AUTO_CREATE_CONSOLE | ConfigFlag::FORCE_HIDE_CONSOLE) {
        return Ok(());
    }

    unsafe {
        let hwnd = GetConsoleWindow();
        if !hwnd.is_invalid() {
            if mask.contains(ConfigFlag::FORCE_HIDE_CONSOLE) {
                let _ = ShowWindow(hwnd, SW_HIDE);
            }
            return Ok(());
        }

        if mask.contains(ConfigFlag::AUTO_CREATE_CONSOLE) {
            debug!("process has no console, allocating a hidden one");
            AllocConsole().map_err(|e| Error::Install(io::Error::new(io::ErrorKind::Other, e)))?;
            let hwnd = GetConsoleWindow();
            if !hwnd.is_invalid() {
                let _ = ShowWindow(hwnd, SW_HIDE);
            }
        }
    }

    Ok(())
}

/// CRT signal handler for SIGINT/SIGTERM/SIGBREAK. After the drain the
/// signal is re-raised with its default disposition so the process dies
/// with the CRT-expected semantics.
extern "C" fn crt_signal_handler(signal: c_int) {
    if orchestrator::global().fire(TerminationNotification::Signal(signal)) {
        unsafe {
            libc::signal(signal, libc::SIG_DFL);
            libc::raise(signal);
        }
    }
}

/// Console control handler, called on an OS-spawned thread.
///
/// Returns TRUE for the close/logoff/shutdown events it handled (the
/// system terminates the process once the handler returns) and FALSE
/// for Ctrl+C/Ctrl+Break so the CRT signal translation stays in charge
/// of those.
unsafe extern "system" fn console_ctrl_handler(ctrl_type: u32) -> BOOL {
    let mask = ConfigFlag::from_bits(INSTALLED_MASK.load(Ordering::SeqCst));

    let handled = match ctrl_type {
        CTRL_CLOSE_EVENT => mask.contains(ConfigFlag::CTRL_CLOSE_EVENT),
        CTRL_LOGOFF_EVENT => mask.contains(ConfigFlag::CTRL_LOGOFF_EVENT),
        CTRL_SHUTDOWN_EVENT => mask.contains(ConfigFlag::CTRL_SHUTDOWN_EVENT),
        _ => false,
    };
    if !handled {
        return FALSE;
    }

    info!(ctrl_type = ctrl_type, "console control event received");
    orchestrator::global().fire(TerminationNotification::ConsoleEvent(ctrl_type));
    TRUE
}

/// Route plain process exit through the orchestrator (MSVCRT `atexit`).
fn register_exit_hook() -> Result<()> {
    let rc = unsafe { libc::atexit(run_exit_callbacks) };
    if rc != 0 {
        return Err(Error::Install(io::Error::new(
            io::ErrorKind::Other,
            "atexit registration failed",
        )));
    }
    Ok(())
}

extern "C" fn run_exit_callbacks() {
    orchestrator::global().fire(TerminationNotification::NormalExit);
}
