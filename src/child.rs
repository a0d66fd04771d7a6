//! Child-side entry: run one selected case inside the isolated process.
//!
//! The parent re-executes the binary with [`CASE_SELECTOR_ENV`] set. The child builds the same registry, looks
//! the case up and turns the body's outcome into its exit status: 0 when the body returns, 1 when it panics.
//! Aborts and fatal signals end the process before any status is chosen, which the parent reports as an error.
//!
//! A fault of the harness itself inside the child (bad selector, no case at the selector) must not look like a
//! failing body: [`abort_with`] writes the diagnostic to the capture channel and aborts, so the parent records
//! the case as errored and shows why.

use std::env::{self, VarError};
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::process;

use crate::error::{HarnessError, HarnessResult};
use crate::registry::{CaseSelector, Registry};

/// Environment variable carrying the `<suite>:<case>` selector to a child.
pub const CASE_SELECTOR_ENV: &str = "ISOTEST_CASE";

/// Exit status of a child whose body panicked.
pub const PANIC_EXIT_CODE: i32 = 1;

/// The case this process was asked to run, if it is an isolated child.
pub fn requested_case() -> HarnessResult<Option<CaseSelector>> {
    match env::var(CASE_SELECTOR_ENV) {
        Ok(raw) => raw.parse().map(Some),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(raw)) => Err(HarnessError::InvalidSelector(raw.to_string_lossy().into_owned())),
    }
}

/// Run the selected case's body in this process.
///
/// ## Returns
/// - (`i32`): the exit status the child should end with.
///
/// ## Errors
/// - `HarnessError::UnknownCase` if the registry has no case at `selector`.
pub fn run_case(registry: &Registry, selector: CaseSelector) -> HarnessResult<i32> {
    let case = registry.case(selector).ok_or(HarnessError::UnknownCase(selector))?;
    tracing::debug!(%selector, case = case.description(), "running case in isolation");

    // Stdout is the capture channel; stderr is discarded by the parent.
    panic::set_hook(Box::new(|info| {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{info}");
        let _ = out.flush();
    }));

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| case.run()));
    let _ = io::stdout().flush();

    Ok(match outcome {
        Ok(()) => 0,
        Err(_) => PANIC_EXIT_CODE,
    })
}

/// Report a harness fault on stdout and end the child abnormally.
pub fn abort_with(err: HarnessError) -> ! {
    tracing::error!(error = %err, "isolated child cannot run its case");
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "{:?}", miette::Report::new(err));
    let _ = out.flush();
    process::abort()
}
