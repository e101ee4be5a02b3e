//! POSIX signal adapter.
//!
//! The raw signal handler installed by `signal-hook` only writes to a
//! self-pipe; arbitrary code is not safe inside a POSIX signal handler,
//! so the callbacks are drained on a dedicated thread that consumes the
//! pipe. After the drain, the signal's default disposition is restored
//! and the signal is re-raised, so the process still dies with the
//! OS-expected semantics (core dump for SIGQUIT, termination for the
//! rest) — callbacks get a chance to run, they cannot veto termination.

use std::io;
use std::thread;

use libc::c_int;
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use signal_hook::low_level;
use tracing::{debug, info};

use crate::config::ConfigFlag;
use crate::error::{Error, Result};
use crate::orchestrator::{self, TerminationNotification};

pub(crate) fn install(mask: ConfigFlag) -> Result<()> {
    register_exit_hook()?;

    let signals = intercepted_signals(mask);
    if signals.is_empty() {
        debug!("no signals in the interception mask");
        return Ok(());
    }

    let mut signals = Signals::new(&signals).map_err(Error::Install)?;
    thread::Builder::new()
        .name("safe-exit-signals".into())
        .spawn(move || {
            for signal in signals.forever() {
                info!(signal = signal, "termination signal received");
                if orchestrator::global().fire(TerminationNotification::Signal(signal)) {
                    let _ = low_level::emulate_default_handler(signal);
                }
            }
        })
        .map_err(Error::Install)?;

    Ok(())
}

fn intercepted_signals(mask: ConfigFlag) -> Vec<c_int> {
    // Windows-only flags are not meaningful here and are ignored.
    let mut signals = Vec::new();
    if mask.contains(ConfigFlag::SIGINT) {
        signals.push(SIGINT);
    }
    if mask.contains(ConfigFlag::SIGTERM) {
        signals.push(SIGTERM);
    }
    if mask.contains(ConfigFlag::SIGQUIT) {
        signals.push(SIGQUIT);
    }
    if mask.contains(ConfigFlag::SIGHUP) {
        signals.push(SIGHUP);
    }
    signals
}

/// Route plain process exit (main returning, `std::process::exit`)
/// through the same orchestrator. Death by signal bypasses atexit, so
/// the two paths cannot double-fire.
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
