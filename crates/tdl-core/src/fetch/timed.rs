//! Timed child-process execution.
//!
//! An attempt is a child process polled against a deadline; on expiry the
//! child is killed and reaped. The caller gets a classified outcome instead
//! of an interrupt.

use std::io::{self, Read};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Keep only the tail of stderr; downloaders can be chatty.
const STDERR_TAIL_BYTES: usize = 8 * 1024;

/// How a timed child finished.
#[derive(Debug)]
pub enum TimedOutcome {
    /// Child exited on its own before the deadline.
    Exited { status: ExitStatus, stdout: Vec<u8>, stderr: String },
    /// Deadline passed; child was killed.
    TimedOut { elapsed: Duration },
}

/// Runs `cmd` to completion or until `deadline` elapses.
///
/// stdout and stderr are drained on helper threads so a full pipe never
/// stalls the child; the threads are joined when the child exits. Set
/// `capture_stdout` to keep stdout (listing mode); otherwise it is discarded.
pub fn run_with_deadline(
    cmd: &mut Command,
    deadline: Duration,
    capture_stdout: bool,
) -> io::Result<TimedOutcome> {
    cmd.stdin(Stdio::null()).stderr(Stdio::piped());
    if capture_stdout {
        cmd.stdout(Stdio::piped());
    } else {
        cmd.stdout(Stdio::null());
    }
    let start = Instant::now();
    let mut child = cmd.spawn()?;

    let stderr_reader = child.stderr.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    });
    let stdout_reader = child.stdout.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    });

    let status = loop {
        if let Some(status) = child.try_wait()? {
            break Some(status);
        }
        if start.elapsed() >= deadline {
            // Already-exited races surface as InvalidInput; either way we reap below.
            let _ = child.kill();
            let _ = child.wait();
            break None;
        }
        thread::sleep(POLL_INTERVAL);
    };

    let Some(status) = status else {
        // Grandchildren (e.g. ffmpeg) may still hold the pipes open, so the
        // readers are left to finish on their own.
        return Ok(TimedOutcome::TimedOut {
            elapsed: start.elapsed(),
        });
    };

    let stderr = stderr_reader
        .and_then(|h| h.join().ok())
        .unwrap_or_default();
    let stdout = stdout_reader
        .and_then(|h| h.join().ok())
        .unwrap_or_default();

    Ok(TimedOutcome::Exited {
        status,
        stdout,
        stderr: stderr_tail(&stderr),
    })
}

fn stderr_tail(raw: &[u8]) -> String {
    let start = raw.len().saturating_sub(STDERR_TAIL_BYTES);
    String::from_utf8_lossy(&raw[start..]).trim().to_string()
}
