//! Windows kill primitives.
//!
//! The graceful request prefers WM_CLOSE to the target's top-level
//! window; console-only targets get a CTRL_C_EVENT after attaching to
//! their console. Escalation is TerminateProcess.

use tracing::debug;

use windows::core::Error as WinError;
use windows::Win32::Foundation::{
    CloseHandle, GetLastError, BOOL, ERROR_ACCESS_DENIED, ERROR_INVALID_PARAMETER, FALSE, HWND,
    LPARAM, STILL_ACTIVE, TRUE, WPARAM,
};
use windows::Win32::System::Console::{
    AttachConsole, FreeConsole, GenerateConsoleCtrlEvent, CTRL_C_EVENT,
};
use windows::Win32::System::Threading::{
    GetExitCodeProcess, OpenProcess, TerminateProcess, PROCESS_QUERY_LIMITED_INFORMATION,
    PROCESS_TERMINATE,
};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetWindowThreadProcessId, PostMessageW, WM_CLOSE,
};

use crate::error::{Error, Result};

pub(crate) fn request_graceful(pid: u32) -> Result<()> {
    probe(pid)?;

    if let Some(hwnd) = find_main_window(pid) {
        debug!(pid = pid, "posting WM_CLOSE to the target window");
        unsafe {
            PostMessageW(hwnd, WM_CLOSE, WPARAM(0), LPARAM(0)).map_err(|e| Error::KillFailed {
                pid,
                reason: e.to_string(),
            })?;
        }
        return Ok(());
    }

    send_console_ctrl_c(pid)
}

pub(crate) fn force_kill(pid: u32) -> Result<()> {
    debug!(pid = pid, "terminating process");
    unsafe {
        let handle = OpenProcess(PROCESS_TERMINATE, FALSE, pid).map_err(|e| open_error(pid, e))?;
        let result = TerminateProcess(handle, 1);
        let _ = CloseHandle(handle);
        result.map_err(|e| Error::KillFailed {
            pid,
            reason: e.to_string(),
        })
    }
}

pub(crate) fn is_alive(pid: u32) -> bool {
    unsafe {
        let Ok(handle) = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, FALSE, pid) else {
            return false;
        };
        let mut code = 0u32;
        let alive =
            GetExitCodeProcess(handle, &mut code).is_ok() && code == STILL_ACTIVE.0 as u32;
        let _ = CloseHandle(handle);
        alive
    }
}

/// Existence/permission probe so a dead pid reports TargetNotFound
/// before any termination request goes out.
fn probe(pid: u32) -> Result<()> {
    unsafe {
        match OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, FALSE, pid) {
            Ok(handle) => {
                let _ = CloseHandle(handle);
                Ok(())
            }
            Err(e) => Err(open_error(pid, e)),
        }
    }
}

fn open_error(pid: u32, e: WinError) -> Error {
    if e.code() == ERROR_ACCESS_DENIED.to_hresult() {
        Error::PermissionDenied(pid)
    } else if e.code() == ERROR_INVALID_PARAMETER.to_hresult() {
        Error::TargetNotFound(pid)
    } else {
        Error::KillFailed {
            pid,
            reason: e.to_string(),
        }
    }
}

/// Attach to the target's console and send it a Ctrl+C.
///
/// Only possible when the caller is not attached to a different
/// console; failing that, the caller gets ConsoleAttachFailed and may
/// decide to force-kill anyway.
fn send_console_ctrl_c(pid: u32) -> Result<()> {
    unsafe {
        if AttachConsole(pid).is_err() {
            let reason = GetLastError().to_hresult().message().to_string();
            return Err(Error::ConsoleAttachFailed { pid, reason });
        }

        debug!(pid = pid, "sending CTRL_C_EVENT to the target console");
        let sent = GenerateConsoleCtrlEvent(CTRL_C_EVENT, pid);
        let _ = FreeConsole();
        sent.map_err(|e| Error::KillFailed {
            pid,
            reason: e.to_string(),
        })
    }
}

struct FindWindowData {
    pid: u32,
    hwnd: Option<HWND>,
}

unsafe extern "system" fn enum_windows_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let data = &mut *(lparam.0 as *mut FindWindowData);
    let mut window_pid = 0u32;
    GetWindowThreadProcessId(hwnd, Some(&mut window_pid as *mut u32));
    if window_pid == data.pid {
        data.hwnd = Some(hwnd);
        // stop enumerating
        return FALSE;
    }
    TRUE
}

fn find_main_window(pid: u32) -> Option<HWND> {
    let mut data = FindWindowData { pid, hwnd: None };
    unsafe {
        // EnumWindows reports an error when the callback stops early;
        // that is the found case, not a failure
        let _ = EnumWindows(
            Some(enum_windows_callback),
            LPARAM(&mut data as *mut FindWindowData as isize),
        );
    }
    data.hwnd
}
