//! Running external tools and capturing what they report.
//!
//! [`ProcessInvoker`] spawns one process per [`Invocation`], waits for it to
//! exit, and returns its exit code with stdout and stderr decoded as text.
//! A nonzero exit is data for the caller to judge, never an error here; only
//! failures to run the tool at all (missing, not executable, hung past the
//! configured bound) are reported as [`RunnerError`]s.
//!
//! # Example
//!
//! ```no_run
//! use toolprobe::invoker::{Invoke, ProcessInvoker};
//! use toolprobe::Invocation;
//!
//! # fn example() -> Result<(), toolprobe::runner::RunnerError> {
//! let invoker = ProcessInvoker::new(None);
//! let result = invoker.invoke(&Invocation::new("/usr/bin/exrcheck", ["-c", "a.exr"]))?;
//! assert_eq!(result.exit_code, 0);
//! # Ok(())
//! # }
//! ```

use crate::model::{Invocation, InvocationResult};
use crate::runner::{elapsed_ms, RunnerError, RunnerResult};
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How often a bounded wait polls the child for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Seam between the runner and real processes.
pub trait Invoke {
    /// Run `invocation` to completion and capture its result.
    fn invoke(&self, invocation: &Invocation) -> RunnerResult<InvocationResult>;
}

/// Invokes tools as child processes of the harness.
///
/// The child inherits the harness's working directory and environment; its
/// stdin is closed.
#[derive(Clone, Debug, Default)]
pub struct ProcessInvoker {
    timeout: Option<Duration>,
}

impl ProcessInvoker {
    /// `timeout` of `None` waits for as long as the tool runs.
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl Invoke for ProcessInvoker {
    fn invoke(&self, invocation: &Invocation) -> RunnerResult<InvocationResult> {
        let started = Instant::now();
        let mut child = Command::new(invocation.program())
            .args(invocation.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| RunnerError::spawn(invocation, &err))?;
        tracing::debug!(pid = child.id(), command = %invocation, "spawned");

        // Drain both pipes concurrently so a chatty tool cannot block on a full pipe.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match self.timeout {
            Some(timeout) => wait_bounded(&mut child, invocation, timeout)?,
            None => child
                .wait()
                .map_err(|err| RunnerError::io("failed to wait for tool", err))?,
        };

        let stdout = collect(stdout)?;
        let stderr = collect(stderr)?;
        let (exit_code, signal) = decode_status(status);
        tracing::debug!(exit_code, ?signal, command = %invocation, "exited");

        Ok(InvocationResult {
            exit_code,
            signal,
            stdout,
            stderr,
            duration_ms: elapsed_ms(&started),
        })
    }
}

fn wait_bounded(
    child: &mut Child,
    invocation: &Invocation,
    timeout: Duration,
) -> RunnerResult<ExitStatus> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if Instant::now() >= deadline {
                    tracing::warn!(command = %invocation, "tool exceeded wait bound; killing");
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(RunnerError::timeout(invocation, timeout));
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(err) => return Err(RunnerError::io("failed to poll tool", err)),
        }
    }
}

type Drain = Option<JoinHandle<std::io::Result<Vec<u8>>>>;

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Drain {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

fn collect(handle: Drain) -> RunnerResult<String> {
    let Some(handle) = handle else {
        return Ok(String::new());
    };
    let bytes = handle
        .join()
        .map_err(|_| RunnerError::io("output reader panicked", "join failed"))?
        .map_err(|err| RunnerError::io("failed to read tool output", err))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(unix)]
fn decode_status(status: ExitStatus) -> (i32, Option<i32>) {
    use std::os::unix::process::ExitStatusExt;
    match (status.code(), status.signal()) {
        (Some(code), _) => (code, None),
        (None, Some(signal)) => (128 + signal, Some(signal)),
        (None, None) => (-1, None),
    }
}

#[cfg(not(unix))]
fn decode_status(status: ExitStatus) -> (i32, Option<i32>) {
    (status.code().unwrap_or(-1), None)
}
