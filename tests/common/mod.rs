//! Shared victim-process plumbing for the integration tests.
//!
//! Each integration test binary re-executes itself with a mode in
//! `SAFE_EXIT_VICTIM_MODE`; the `victim` test in that child then plays
//! the target process instead of running assertions. The victim prints
//! a ready marker once its callbacks are registered, so the parent
//! never signals a half-initialized process.

#![allow(dead_code)]

use std::env;
use std::io::{BufRead, BufReader, Read};
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};

pub const MODE_ENV: &str = "SAFE_EXIT_VICTIM_MODE";
pub const READY_MARKER: &str = "victim-ready";

/// The mode this process should play, if it is a victim.
pub fn victim_mode() -> Option<String> {
    env::var(MODE_ENV).ok()
}

pub struct Victim {
    child: Child,
    reader: BufReader<ChildStdout>,
    collected: String,
}

/// Re-execute the current test binary as a victim in the given mode and
/// wait until it reports ready.
pub fn spawn_victim(mode: &str) -> Victim {
    let exe = env::current_exe().expect("test binary path");
    let mut child = Command::new(exe)
        .args(["victim", "--exact", "--nocapture"])
        .env(MODE_ENV, mode)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn victim process");

    let reader = BufReader::new(child.stdout.take().expect("victim stdout"));
    let mut victim = Victim {
        child,
        reader,
        collected: String::new(),
    };
    victim.wait_ready();
    victim
}

impl Victim {
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    fn wait_ready(&mut self) {
        for _ in 0..100 {
            let mut line = String::new();
            let read = self.reader.read_line(&mut line).expect("read victim stdout");
            if read == 0 {
                panic!("victim exited before becoming ready:\n{}", self.collected);
            }
            self.collected.push_str(&line);
            if line.contains(READY_MARKER) {
                return;
            }
        }
        panic!("victim never became ready:\n{}", self.collected);
    }

    /// Collect the remaining output and reap the victim.
    pub fn finish(mut self) -> (ExitStatus, String) {
        let mut rest = String::new();
        self.reader
            .read_to_string(&mut rest)
            .expect("read victim stdout");
        self.collected.push_str(&rest);
        let status = self.child.wait().expect("wait for victim");
        (status, self.collected)
    }
}

pub fn count_markers(output: &str, marker: &str) -> usize {
    output.matches(marker).count()
}

/// Block until an intercepted notification kills the process. The
/// abort (which skips the exit hooks) only triggers if the parent test
/// failed to kill this victim within the watchdog window.
pub fn park_until_killed() -> ! {
    for _ in 0..300 {
        std::thread::sleep(std::time::Duration::from_millis(50));
    }
    std::process::abort();
}
