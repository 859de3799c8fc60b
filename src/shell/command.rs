//! Blocking command capture.
//!
//! Runs a program with an explicit environment, drains stdout and stderr
//! on reader threads, and waits for exit. The child leads its own process
//! group; if capture is abandoned the whole group is killed and the child
//! reaped.

use crate::error::{LoginEnvError, Result};
use std::collections::HashMap;
use std::io::{self, Read};
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long the readers get to hit EOF once the process group is killed.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

/// Result of running a captured command.
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Raw standard output.
    pub stdout: Vec<u8>,

    /// Raw standard error.
    pub stderr: Vec<u8>,

    /// Execution duration.
    pub duration: Duration,

    /// Whether the command succeeded (exit code 0).
    pub success: bool,
}

/// Options for command capture.
#[derive(Debug, Clone, Default)]
pub struct CaptureOptions {
    /// The complete environment of the child. Nothing is inherited.
    pub env: HashMap<String, String>,

    /// Maximum time to wait for exit and output (None = no timeout).
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// Owns a child process and its process group.
///
/// Unless capture finished, dropping the guard kills the group (so
/// background jobs release the output pipes) and reaps the child.
struct ChildGuard {
    child: Child,
    reaped: bool,
    finished: bool,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self {
            child,
            reaped: false,
            finished: false,
        }
    }

    fn kill_group(&mut self) {
        #[cfg(unix)]
        {
            // SAFETY: killpg has no memory effects; the child was spawned
            // with process_group(0), so its pid is the group id. The group
            // cannot be recycled while the child is unreaped or other
            // members remain.
            unsafe {
                libc::killpg(self.child.id() as libc::pid_t, libc::SIGKILL);
            }
        }

        #[cfg(not(unix))]
        {
            let _ = self.child.kill();
        }
    }

    fn wait(&mut self) -> io::Result<ExitStatus> {
        let status = self.child.wait()?;
        self.reaped = true;
        Ok(status)
    }

    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        let status = self.child.try_wait()?;
        self.reaped = status.is_some();
        Ok(status)
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if !self.finished {
            self.kill_group();
        }
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Run `program` with `args` and capture its output.
///
/// The child gets a null stdin and exactly `options.env` as its
/// environment. A non-zero exit status is not an error here; callers
/// inspect [`CapturedOutput::success`].
///
/// With a timeout, the child must exit before the deadline or the result
/// is [`LoginEnvError::Timeout`]. If it exits in time but something it
/// started in the background still holds stdout or stderr open at the
/// deadline, the process group is killed and the output read so far is
/// returned. Only a holder outside the group, which survives the kill,
/// yields [`LoginEnvError::OutputHeldOpen`].
///
/// # Example
///
/// ```no_run
/// use loginenv::shell::{capture_output, CaptureOptions};
///
/// let output = capture_output("/bin/sh", &["-c", "echo hi"], &CaptureOptions::default()).unwrap();
/// assert!(output.success);
/// assert_eq!(output.stdout, b"hi\n");
/// ```
pub fn capture_output(
    program: &str,
    args: &[&str],
    options: &CaptureOptions,
) -> Result<CapturedOutput> {
    let start = Instant::now();
    let deadline = options.timeout.map(|t| start + t);

    let mut cmd = Command::new(program);
    cmd.args(args)
        .env_clear()
        .envs(&options.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    cmd.process_group(0);

    tracing::debug!("Spawning {} {:?}", program, args);

    let child = cmd.spawn().map_err(|source| LoginEnvError::SpawnFailed {
        shell: program.to_string(),
        source,
    })?;
    let mut guard = ChildGuard::new(child);

    let (tx, rx) = mpsc::channel();
    if let Some(stdout) = guard.child.stdout.take() {
        spawn_reader(Stream::Stdout, stdout, tx.clone());
    }
    if let Some(stderr) = guard.child.stderr.take() {
        spawn_reader(Stream::Stderr, stderr, tx);
    }

    let timed_out = || LoginEnvError::Timeout {
        shell: program.to_string(),
        timeout: options.timeout.unwrap_or_default(),
    };

    let status = match deadline {
        None => guard.wait()?,
        Some(deadline) => loop {
            if let Some(status) = guard.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                return Err(timed_out());
            }
            thread::sleep(POLL_INTERVAL);
        },
    };

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut wait_until = deadline;
    let mut group_killed = false;
    let mut delivered = 0;
    while delivered < 2 {
        let received = match wait_until {
            None => rx.recv().map_err(|_| reader_stopped())?,
            Some(until) => match rx.recv_timeout(until.saturating_duration_since(Instant::now())) {
                Ok(received) => received,
                Err(mpsc::RecvTimeoutError::Disconnected) => return Err(reader_stopped()),
                Err(mpsc::RecvTimeoutError::Timeout) if !group_killed => {
                    tracing::debug!(
                        "{} exited but its output is still open, killing its process group",
                        program
                    );
                    guard.kill_group();
                    group_killed = true;
                    wait_until = Some(Instant::now() + DRAIN_GRACE);
                    continue;
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    return Err(LoginEnvError::OutputHeldOpen {
                        shell: program.to_string(),
                    })
                }
            },
        };

        delivered += 1;
        match received {
            (Stream::Stdout, bytes) => stdout = bytes?,
            (Stream::Stderr, bytes) => stderr = bytes?,
        }
    }
    guard.finished = true;

    let duration = start.elapsed();
    tracing::debug!(
        "{} exited with {:?} after {:?} ({} bytes of output)",
        program,
        status.code(),
        duration,
        stdout.len()
    );

    Ok(CapturedOutput {
        exit_code: status.code(),
        stdout,
        stderr,
        duration,
        success: status.success(),
    })
}

type Delivery = (Stream, io::Result<Vec<u8>>);

fn spawn_reader<R>(stream: Stream, mut reader: R, tx: mpsc::Sender<Delivery>)
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buf = Vec::new();
        let result = reader.read_to_end(&mut buf).map(|_| buf);
        let _ = tx.send((stream, result));
    });
}

fn reader_stopped() -> LoginEnvError {
    LoginEnvError::Io(io::Error::new(
        io::ErrorKind::BrokenPipe,
        "output reader stopped before delivering output",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str, options: &CaptureOptions) -> Result<CapturedOutput> {
        let mut options = options.clone();
        options
            .env
            .entry("PATH".to_string())
            .or_insert_with(|| "/usr/bin:/bin".to_string());
        capture_output("/bin/sh", &["-c", script], &options)
    }

    #[test]
    fn captures_stdout() {
        let result = sh("echo hello", &CaptureOptions::default()).unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.stdout, b"hello\n");
    }

    #[test]
    fn captures_stderr_separately() {
        let result = sh("echo oops >&2", &CaptureOptions::default()).unwrap();

        assert!(result.stdout.is_empty());
        assert_eq!(result.stderr, b"oops\n");
    }

    #[test]
    fn reports_failing_exit_code() {
        let result = sh("exit 3", &CaptureOptions::default()).unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
    }

    #[test]
    fn child_sees_only_the_given_environment() {
        let mut options = CaptureOptions::default();
        options
            .env
            .insert("MY_VAR".to_string(), "my_value".to_string());

        let result = capture_output("/usr/bin/env", &[], &options).unwrap();
        let stdout = String::from_utf8(result.stdout).unwrap();

        assert_eq!(stdout.trim(), "MY_VAR=my_value");
    }

    #[test]
    fn stdin_is_closed() {
        let result = sh("cat; echo done", &CaptureOptions::default()).unwrap();
        assert_eq!(result.stdout, b"done\n");
    }

    #[test]
    fn missing_program_is_spawn_failure() {
        let err = capture_output("/nonexistent/shell", &[], &CaptureOptions::default())
            .unwrap_err();

        assert!(matches!(
            err,
            LoginEnvError::SpawnFailed { ref shell, .. } if shell == "/nonexistent/shell"
        ));
    }

    #[test]
    fn slow_command_times_out() {
        let options = CaptureOptions {
            timeout: Some(Duration::from_millis(200)),
            ..Default::default()
        };

        let start = Instant::now();
        let err = sh("sleep 5", &options).unwrap_err();

        assert!(matches!(err, LoginEnvError::Timeout { .. }));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn background_job_does_not_hold_output_past_deadline() {
        let options = CaptureOptions {
            timeout: Some(Duration::from_millis(300)),
            ..Default::default()
        };

        let start = Instant::now();
        let result = sh("sleep 4 & echo done", &options).unwrap();

        assert!(result.success);
        assert_eq!(result.stdout, b"done\n");
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn holder_outside_the_group_is_reported() {
        if !std::path::Path::new("/usr/bin/setsid").exists() {
            return;
        }
        let options = CaptureOptions {
            timeout: Some(Duration::from_millis(300)),
            ..Default::default()
        };

        let start = Instant::now();
        let err = sh("/usr/bin/setsid sleep 4 & echo done", &options).unwrap_err();

        assert!(matches!(err, LoginEnvError::OutputHeldOpen { .. }), "{}", err);
        assert!(!err.to_string().contains("did not exit"));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn fast_command_finishes_within_timeout() {
        let options = CaptureOptions {
            timeout: Some(Duration::from_secs(10)),
            ..Default::default()
        };

        let result = sh("echo fast", &options).unwrap();

        assert!(result.success);
        assert!(result.duration < Duration::from_secs(10));
    }

    #[test]
    fn large_output_is_fully_drained() {
        let result = sh(
            "i=0; while [ $i -lt 20000 ]; do echo line$i; echo err$i >&2; i=$((i+1)); done",
            &CaptureOptions::default(),
        )
        .unwrap();

        assert!(result.success);
        let stdout = String::from_utf8(result.stdout).unwrap();
        assert_eq!(stdout.lines().count(), 20000);
    }
}
