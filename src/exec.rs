//! Bounded-timeout subprocess execution.
//!
//! Every external collaborator (tag extractor, git, content-search tool)
//! is invoked through [`run_with_timeout`], which spawns the process,
//! drains stdout on a reader thread, and polls `try_wait` against a
//! deadline.  A process that outlives its deadline is killed.  Callers
//! receive a structured [`ExecError`] and map each failure class to a
//! non-fatal degradation; nothing here panics or blocks indefinitely.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

/// How long to sleep between `try_wait` polls.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Failure classes for an external tool invocation.
#[derive(Error, Debug)]
pub enum ExecError {
    /// The executable was not found on PATH.
    #[error("executable not found: {0}")]
    NotFound(String),

    /// The process did not finish within the deadline and was killed.
    #[error("command timed out after {0:?}")]
    TimedOut(Duration),

    /// The process exited with a non-zero status.
    #[error("command exited with status {0}")]
    Failed(i32),

    /// Spawning or waiting failed at the OS level.
    #[error("subprocess error: {0}")]
    Io(#[from] std::io::Error),
}

/// Captured output of a successfully completed command.
#[derive(Debug, Clone)]
pub struct Captured {
    /// Stdout decoded lossily as UTF-8.
    pub stdout: String,
}

/// Run `cmd` to completion within `timeout`, capturing stdout.
///
/// Stdin and stderr are discarded.  Returns [`ExecError::NotFound`] when
/// the binary is missing, [`ExecError::TimedOut`] when the deadline
/// elapses (the child is killed and reaped), and [`ExecError::Failed`]
/// for a non-zero exit status.
pub fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<Captured, ExecError> {
    let program = cmd.get_program().to_string_lossy().into_owned();

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExecError::NotFound(program.clone())
            } else {
                ExecError::Io(e)
            }
        })?;

    // Drain stdout on a separate thread so the child never blocks on a
    // full pipe while we poll for completion.
    let mut stdout_pipe = child.stdout.take().expect("stdout was piped");
    let reader = thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stdout_pipe.read_to_end(&mut buf);
        buf
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            // Reader thread finishes once the pipe closes.
            let _ = reader.join();
            return Err(ExecError::TimedOut(timeout));
        }
        thread::sleep(POLL_INTERVAL);
    };

    let bytes = reader.join().unwrap_or_default();
    let stdout = String::from_utf8_lossy(&bytes).into_owned();

    if !status.success() {
        return Err(ExecError::Failed(status.code().unwrap_or(-1)));
    }

    Ok(Captured { stdout })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_executable_is_not_found() {
        let err = run_with_timeout(
            &mut Command::new("definitely-not-a-real-tool-4242"),
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, ExecError::NotFound(_)));
    }

    #[test]
    fn captures_stdout() {
        let out = run_with_timeout(
            Command::new("echo").arg("hello"),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[test]
    fn nonzero_exit_is_failed() {
        let err = run_with_timeout(
            Command::new("sh").args(["-c", "exit 7"]),
            Duration::from_secs(5),
        )
        .unwrap_err();
        assert!(matches!(err, ExecError::Failed(7)));
    }

    #[test]
    fn slow_process_times_out() {
        let start = Instant::now();
        let err = run_with_timeout(
            Command::new("sleep").arg("10"),
            Duration::from_millis(200),
        )
        .unwrap_err();
        assert!(matches!(err, ExecError::TimedOut(_)));
        // Must return promptly, not after the full sleep.
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
