//! Command-line entry point for harness binaries
//!
//! A test binary builds its [`Registry`] and hands it to [`run`] together with the parsed [`HarnessArgs`]. The
//! same binary plays two roles:
//!
//! - **Parent** (no `ISOTEST_CASE` in the environment): execute every case in its own child and print the report.
//! - **Child** (`ISOTEST_CASE=<suite>:<case>`): run that one case's body in-process and exit with its status.
//!
//! ## Design
//!
//! `HarnessArgs` derives `clap::Args` so host binaries can `#[command(flatten)]` it into their own parser.
//! Everything below [`run`] returns `CliResult<T>`; only `run` calls `process::exit`.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::fmt;
use std::io::{self, Write};
use std::process;

use clap::Args;

use crate::child;
use crate::config::{ColorMode, DEFAULT_CAPTURE_LIMIT, ExitPolicy, HarnessConfig};
use crate::error::HarnessError;
use crate::executor::{Executor, SelfExec};
use crate::registry::Registry;
use crate::report::{self, ConsoleReporter};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    /// At least one case failed or errored.
    pub const FAILURE: ExitCode = ExitCode(1);
    /// The harness itself could not do its job.
    pub const HARNESS_FAULT: ExitCode = ExitCode(2);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The entry point prints the message and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<HarnessError> for CliError {
    fn from(err: HarnessError) -> Self {
        let rendered = format!("{:?}", miette::Report::new(err));
        Self::new(rendered, ExitCode::HARNESS_FAULT)
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap arguments
// ============================================================================

/// Harness options, meant to be flattened into the host binary's parser.
#[derive(Args, Debug, Clone)]
pub struct HarnessArgs {
    /// When to color the report
    #[arg(long, value_enum, env = "ISOTEST_COLOR", default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Bytes of output kept per case; the rest is discarded
    #[arg(long, value_name = "BYTES", env = "ISOTEST_CAPTURE_LIMIT", default_value_t = DEFAULT_CAPTURE_LIMIT)]
    pub capture_limit: usize,

    /// Exit 0 even when cases fail or error
    #[arg(long)]
    pub exit_zero: bool,

    /// List registered cases without running them
    #[arg(long)]
    pub list: bool,
}

impl From<&HarnessArgs> for HarnessConfig {
    fn from(args: &HarnessArgs) -> Self {
        Self {
            capture_limit: args.capture_limit,
            color: args.color,
            exit_policy: if args.exit_zero {
                ExitPolicy::AlwaysZero
            } else {
                ExitPolicy::FailOnProblems
            },
        }
    }
}

// ============================================================================
// Entry point
// ============================================================================

/// Run the harness over `registry` and exit the process.
///
/// This is the only place where `process::exit` is called.
pub fn run(registry: Registry, args: &HarnessArgs) -> ! {
    let result = execute(registry, args);
    let _ = io::stdout().flush();
    match result {
        Ok(exit_code) => process::exit(exit_code.0),
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the parent or child role and return the exit code.
///
/// In the child role a harness fault never returns: it aborts the child so the parent sees an errored case.
pub fn execute(mut registry: Registry, args: &HarnessArgs) -> CliResult<ExitCode> {
    match child::requested_case() {
        Ok(None) => {}
        Ok(Some(selector)) => {
            return match child::run_case(&registry, selector) {
                Ok(code) => Ok(ExitCode(code)),
                Err(err) => child::abort_with(err),
            };
        }
        Err(err) => child::abort_with(err),
    }

    if args.list {
        report::write_listing(&mut io::stdout().lock(), &registry).map_err(HarnessError::from)?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = HarnessConfig::from(args);
    tracing::debug!(?config, cases = registry.case_count(), "starting run");

    let executor = Executor::new(SelfExec::current()?).with_capture_limit(config.capture_limit);
    let mut reporter = ConsoleReporter::stdout(config.color.use_colors());
    let tally = executor.run(&mut registry, &mut reporter)?;

    Ok(config.exit_code_for(&tally))
}

/// Initialize structured logging on stderr, filtered by `RUST_LOG` and defaulting to `warn`.
///
/// Logs never go to stdout: stdout carries the report in the parent and the captured output in children.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();
}

// ============================================================================
// Tests
// ============================================================================
