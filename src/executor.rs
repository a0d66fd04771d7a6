//! Isolation executor
//!
//! Runs every registered case in its own child process so that a panic, abort, fatal signal or resource
//! exhaustion inside a test body can only ever end that one child.
//!
//! ## Per-case protocol
//!
//! 1. Flush the harness's stdout so parent and child output never interleave.
//! 2. Spawn the child described by the [`CaseLauncher`] with stdout connected to a pipe.
//! 3. Read up to `capture_limit` bytes from the pipe, then drain the rest until the child closes it.
//! 4. Wait for the child and decode its exit status into a [`Termination`].
//! 5. Record the result on the case and hand it to the reporter.
//!
//! Pipe ends and the child handle are owned locally and dropped before the next case starts. Cases run one at a
//! time and there is no timeout: a body that never returns stalls the run.

use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use isotest_core::{Tally, Termination};

use crate::child::CASE_SELECTOR_ENV;
use crate::config::DEFAULT_CAPTURE_LIMIT;
use crate::error::{HarnessError, HarnessResult};
use crate::registry::{CaseSelector, Registry};
use crate::report::Reporter;

// ============================================================================
// Case launcher interface
// ============================================================================

/// Build the command that runs exactly one case in a fresh process.
///
/// The executor owns stdio wiring, spawning and waiting; implementations only decide *what* to run. This seam
/// exists so the process protocol can be exercised without the harness binary.
pub trait CaseLauncher {
    fn command(&self, selector: CaseSelector) -> Command;
}

/// Re-execute the current binary with the same arguments, selecting the case through `ISOTEST_CASE`.
#[derive(Debug, Clone)]
pub struct SelfExec {
    program: PathBuf,
    args: Vec<OsString>,
}

impl SelfExec {
    pub fn new(program: impl Into<PathBuf>, args: Vec<OsString>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Launcher for the running process: `current_exe()` plus the arguments it was started with.
    pub fn current() -> HarnessResult<Self> {
        let program = std::env::current_exe().map_err(HarnessError::CurrentExe)?;
        Ok(Self::new(program, std::env::args_os().skip(1).collect()))
    }
}

impl CaseLauncher for SelfExec {
    fn command(&self, selector: CaseSelector) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).env(CASE_SELECTOR_ENV, selector.to_string());
        command
    }
}

// ============================================================================
// Execution
// ============================================================================

/// What one isolated run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub termination: Termination,
    pub captured_output: String,
}

pub struct Executor<L> {
    launcher: L,
    capture_limit: usize,
}

impl<L: CaseLauncher> Executor<L> {
    pub fn new(launcher: L) -> Self {
        Self {
            launcher,
            capture_limit: DEFAULT_CAPTURE_LIMIT,
        }
    }

    pub fn with_capture_limit(mut self, capture_limit: usize) -> Self {
        self.capture_limit = capture_limit;
        self
    }

    /// Execute every case in traversal order, recording results and feeding the reporter.
    ///
    /// ## Returns
    /// - (`Tally`): counts over every scheduled case, including cases whose process never started.
    ///
    /// ## Errors
    /// - `HarnessError::Report` if the reporter cannot write.
    /// - `HarnessError::AlreadyRecorded` if the registry was already executed.
    #[tracing::instrument(skip_all, fields(cases = registry.case_count()))]
    pub fn run(&self, registry: &mut Registry, reporter: &mut dyn Reporter) -> HarnessResult<Tally> {
        reporter.on_run_start(registry.case_count())?;

        let selectors: Vec<CaseSelector> = registry.selectors().collect();
        let mut tally = Tally::default();
        for selector in selectors {
            let execution = self.execute(selector);
            let case = registry
                .case_mut(selector)
                .ok_or(HarnessError::UnknownCase(selector))?;
            let status = case.record(execution.termination, execution.captured_output)?;
            tally.record(status);
            reporter.on_case_complete(case)?;
        }

        reporter.on_run_complete(registry, &tally)?;
        Ok(tally)
    }

    /// Run one case in a child process and collect its termination and bounded output.
    pub fn execute(&self, selector: CaseSelector) -> Execution {
        // Anything still buffered would otherwise be duplicated or reordered around the child's lifetime.
        let _ = io::stdout().flush();

        let mut command = self.launcher.command(selector);
        command.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::null());

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                tracing::warn!(%selector, error = %err, "could not start child process");
                let termination = Termination::SpawnFailed(err.to_string());
                let captured_output = termination.to_string();
                return Execution {
                    termination,
                    captured_output,
                };
            }
        };
        tracing::debug!(%selector, pid = child.id(), "spawned case");

        let captured = match child.stdout.take() {
            Some(mut pipe) => capture_bounded(&mut pipe, self.capture_limit).unwrap_or_else(|err| {
                tracing::warn!(%selector, error = %err, "reading child output failed");
                Vec::new()
            }),
            None => Vec::new(),
        };
        let captured_output = String::from_utf8_lossy(&captured).into_owned();

        let termination = match child.wait() {
            Ok(status) => decode_exit_status(status),
            Err(err) => {
                tracing::warn!(%selector, error = %err, "waiting for child failed");
                let _ = child.kill();
                let _ = child.wait();
                Termination::Unknown(err.to_string())
            }
        };
        tracing::debug!(%selector, %termination, status = %termination.status(), "case finished");

        Execution {
            termination,
            captured_output,
        }
    }
}

/// Read at most `limit` bytes, then discard whatever else the writer sends until it closes the stream.
///
/// Draining keeps a chatty child from blocking on a full pipe or failing its writes on a closed one; the bytes
/// beyond `limit` are dropped without an error.
pub fn capture_bounded<R: Read>(reader: &mut R, limit: usize) -> io::Result<Vec<u8>> {
    let mut captured = Vec::with_capacity(limit.min(8 * 1024));
    reader.by_ref().take(limit as u64).read_to_end(&mut captured)?;
    let discarded = io::copy(reader, &mut io::sink())?;
    if discarded > 0 {
        tracing::debug!(kept = captured.len(), discarded, "child output truncated");
    }
    Ok(captured)
}

/// Decode a finished child's exit status.
pub fn decode_exit_status(status: ExitStatus) -> Termination {
    if let Some(code) = status.code() {
        return Termination::Exited(code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Termination::Signaled(signal);
        }
    }
    Termination::Unknown(format!("{status}"))
}

// ============================================================================
// Tests
// ============================================================================
