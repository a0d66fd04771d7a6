//! Provide the shared outcome vocabulary for the isotest harness.
//!
//! This crate is intentionally small and dependency-free. It owns the rules that turn "how did the child process
//! end" into "what happened to the test", so the executor, the reporter and the tests all agree on them.
//!
//! ## Notes
//!
//! - This is a "semantic core" crate: **no IO**, no process handling, no global state.
//! - Decoding an OS exit status into a [`Termination`] is the executor's job; this crate only classifies.

pub mod location;
pub mod tally;

use std::fmt;

pub use location::SourceLocation;
pub use tally::Tally;

/// Lifecycle state of a single test case.
///
/// A case starts `Unrun` and moves to exactly one terminal state once its child process has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseStatus {
    #[default]
    Unrun,
    Passed,
    /// The body signalled a detected failure (non-zero exit status).
    Failed,
    /// The body did not complete normally, or its process could not be started.
    Errored,
}

impl CaseStatus {
    /// Check whether the status is final.
    ///
    /// ## Returns
    /// - (`bool`): `true` for every state except `Unrun`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, CaseStatus::Unrun)
    }

    /// The single progress character printed when a case completes.
    ///
    /// ## Returns
    /// - (`Option<char>`): `.`, `F` or `E`; `None` for a case that has not run.
    pub fn progress_glyph(self) -> Option<char> {
        match self {
            CaseStatus::Unrun => None,
            CaseStatus::Passed => Some('.'),
            CaseStatus::Failed => Some('F'),
            CaseStatus::Errored => Some('E'),
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CaseStatus::Unrun => "unrun",
            CaseStatus::Passed => "passed",
            CaseStatus::Failed => "failed",
            CaseStatus::Errored => "errored",
        };
        f.write_str(label)
    }
}

/// How the isolated child for one case came to an end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The process exited normally with this code.
    Exited(i32),
    /// The process was killed by this signal number.
    Signaled(i32),
    /// The process could not be created at all.
    SpawnFailed(String),
    /// The process ran but its fate could not be determined (no exit code, or waiting failed).
    Unknown(String),
}

impl Termination {
    /// Classify a termination into the case status it implies.
    ///
    /// ## Returns
    /// - (`CaseStatus`): `Passed` for exit code 0, `Failed` for any other exit code, `Errored` otherwise.
    ///
    /// ## Examples
    /// ```rust
    /// use isotest_core::{CaseStatus, Termination};
    /// assert_eq!(Termination::Exited(0).status(), CaseStatus::Passed);
    /// assert_eq!(Termination::Exited(101).status(), CaseStatus::Failed);
    /// assert_eq!(Termination::Signaled(11).status(), CaseStatus::Errored);
    /// ```
    pub fn status(&self) -> CaseStatus {
        match self {
            Termination::Exited(0) => CaseStatus::Passed,
            Termination::Exited(_) => CaseStatus::Failed,
            Termination::Signaled(_) | Termination::SpawnFailed(_) | Termination::Unknown(_) => CaseStatus::Errored,
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Exited(code) => write!(f, "exited with status {code}"),
            Termination::Signaled(signal) => match signal_name(*signal) {
                Some(name) => write!(f, "killed by signal {signal} ({name})"),
                None => write!(f, "killed by signal {signal}"),
            },
            Termination::SpawnFailed(reason) => write!(f, "could not start child process: {reason}"),
            Termination::Unknown(reason) => write!(f, "unknown termination: {reason}"),
        }
    }
}

/// Conventional name of a POSIX signal whose number is the same on every unix we run on.
pub fn signal_name(signal: i32) -> Option<&'static str> {
    let name = match signal {
        1 => "SIGHUP",
        2 => "SIGINT",
        3 => "SIGQUIT",
        4 => "SIGILL",
        6 => "SIGABRT",
        8 => "SIGFPE",
        9 => "SIGKILL",
        11 => "SIGSEGV",
        13 => "SIGPIPE",
        14 => "SIGALRM",
        15 => "SIGTERM",
        _ => return None,
    };
    Some(name)
}
