#![forbid(unsafe_code)]
//! isotest: a minimal unit-test harness with process isolation
//!
//! Test authors register named cases, optionally grouped into suites, into a [`Registry`]. The harness then runs
//! every case in a fresh child process, captures a bounded amount of its output, classifies how it ended and
//! prints a progress-and-summary report:
//!
//! - **Passed**: the body returned (exit status 0).
//! - **Failed**: the body signalled a detected failure, usually a panicking assertion (non-zero exit status).
//! - **Errored**: the body crashed, aborted or was killed by a signal, or its process could not be started.
//!
//! Data flows one way: [`registry`] → [`executor`] → [`report`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use clap::Parser;
//! use isotest::cli::{self, HarnessArgs};
//! use isotest::Registry;
//!
//! #[derive(Parser)]
//! struct Args {
//!     #[command(flatten)]
//!     harness: HarnessArgs,
//! }
//!
//! fn main() {
//!     let args = Args::parse();
//!     let registry = Registry::builder()
//!         .suite("Math")
//!         .case("adds", || assert_eq!(2 + 2, 4))
//!         .build();
//!     cli::run(registry, &args.harness);
//! }
//! ```
//!
//! ## Panic Policy
//!
//! Production code uses `Result` with `?`; the `cli` module enforces `#![deny(clippy::unwrap_used)]`. Panics in
//! test bodies are expected and stay inside the child process.

pub mod child;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod registry;
pub mod report;
pub mod version;

pub use isotest_core::{CaseStatus, SourceLocation, Tally, Termination};

pub use config::{ColorMode, ExitPolicy, HarnessConfig};
pub use error::{HarnessError, HarnessResult};
pub use executor::{CaseLauncher, Execution, Executor, SelfExec};
pub use registry::{CaseSelector, Registry, RegistryBuilder, TestCase, TestSuite};
pub use report::{ConsoleReporter, Reporter};
