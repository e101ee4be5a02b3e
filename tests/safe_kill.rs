//! End-to-end safe-kill tests against real victim processes.

#![cfg(unix)]

mod common;

use std::os::unix::process::ExitStatusExt;
use std::time::Duration;

use nix::sys::signal::{signal, SigHandler, Signal};

use common::{count_markers, park_until_killed, spawn_victim, victim_mode, READY_MARKER};
use safe_exit::{safe_kill, Error, KillOutcome, DEFAULT_GRACE_TIMEOUT};

const MARKER: &str = "victim cleanup-done";

/// Victim entry point; does nothing unless re-executed by a test.
#[test]
fn victim() {
    let Some(mode) = victim_mode() else { return };

    match mode.as_str() {
        // handles the graceful request through its own cleanup hooks
        "cooperative" => {
            safe_exit::register(|| println!("{MARKER}")).unwrap();
        }
        // ignores SIGTERM outright, forcing the escalation path
        "stubborn" => {
            unsafe { signal(Signal::SIGTERM, SigHandler::SigIgn) }.expect("ignore SIGTERM");
        }
        other => panic!("unknown victim mode {other}"),
    }

    println!("{READY_MARKER}");
    park_until_killed();
}

#[tokio::test]
async fn cooperative_target_terminates_gracefully() {
    let victim = spawn_victim("cooperative");

    let outcome = safe_kill(victim.pid(), DEFAULT_GRACE_TIMEOUT).await.unwrap();
    assert_eq!(outcome, KillOutcome::TerminatedGracefully);

    let (status, output) = victim.finish();
    assert_eq!(count_markers(&output, MARKER), 1);
    assert_eq!(status.signal(), Some(Signal::SIGTERM as i32));
}

#[tokio::test]
async fn stubborn_target_is_forced() {
    let victim = spawn_victim("stubborn");

    let outcome = safe_kill(victim.pid(), Duration::from_millis(600)).await.unwrap();
    assert_eq!(outcome, KillOutcome::Forced);

    let (status, output) = victim.finish();
    assert_eq!(count_markers(&output, MARKER), 0);
    assert_eq!(status.signal(), Some(Signal::SIGKILL as i32));
}

#[tokio::test]
async fn missing_target_reports_not_found() {
    let fake_pid = 999_999_999;
    match safe_kill(fake_pid, Duration::from_secs(1)).await {
        Err(Error::TargetNotFound(pid)) => assert_eq!(pid, fake_pid),
        other => panic!("expected TargetNotFound, got {other:?}"),
    }
}
