//! Harness-level errors.
//!
//! These describe faults of the harness itself. A test that fails or crashes is never an error here: its outcome is
//! recorded on the case and reported.

use miette::Diagnostic;
use thiserror::Error;

use crate::registry::CaseSelector;

#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error("could not locate the running test binary: {0}")]
    #[diagnostic(
        code(isotest::current_exe),
        help("isolated cases re-execute the current binary; make sure it is still present on disk")
    )]
    CurrentExe(#[source] std::io::Error),

    #[error("invalid case selector `{0}`")]
    #[diagnostic(
        code(isotest::selector),
        help("selectors have the form `<suite>:<case>`, both zero-based indices")
    )]
    InvalidSelector(String),

    #[error("no test case registered at {0}")]
    #[diagnostic(
        code(isotest::unknown_case),
        help("the child process must build the same registry as its parent; avoid registering cases conditionally")
    )]
    UnknownCase(CaseSelector),

    #[error("result for `{description}` was already recorded")]
    #[diagnostic(code(isotest::already_recorded))]
    AlreadyRecorded { description: String },

    #[error("failed to write the report: {0}")]
    #[diagnostic(code(isotest::report))]
    Report(#[from] std::io::Error),
}

pub type HarnessResult<T> = Result<T, HarnessError>;
