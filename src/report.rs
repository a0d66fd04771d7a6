//! Test reporting
//!
//! ## Reporter Trait
//!
//! The executor talks to a [`Reporter`] so that output format is separate from execution. The console reporter
//! prints one progress character per case while the run is going, then itemised failures and errors and a
//! summary line:
//!
//! ```text
//! .E
//!
//! Errors:
//!
//!    1) Math divides by zero
//!       # ./tests/math.rs:12
//!
//! 2 examples, 0 failures, 1 errors
//! ```
//!
//! Reporters never change case state; they only read what the executor recorded.

use std::io::{self, Write};

use isotest_core::{CaseStatus, Tally};

use crate::registry::{Registry, TestCase, TestSuite};

const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";

/// Indentation of location and captured-output lines under an entry.
const DETAIL_INDENT: &str = "      ";

/// Receives run events in traversal order.
pub trait Reporter {
    /// Called once before the first case runs
    fn on_run_start(&mut self, _total: usize) -> io::Result<()> {
        Ok(())
    }

    /// Called after each case's result has been recorded
    fn on_case_complete(&mut self, case: &TestCase) -> io::Result<()>;

    /// Called after every case has run
    fn on_run_complete(&mut self, registry: &Registry, tally: &Tally) -> io::Result<()>;
}

/// Terminal reporter: progress dots, Failures/Errors listings, colored summary.
pub struct ConsoleReporter<W> {
    out: W,
    colors: bool,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout(colors: bool) -> Self {
        Self::new(io::stdout(), colors)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, colors: bool) -> Self {
        Self { out, colors }
    }

    fn paint(&self, text: &str, color: &str) -> String {
        if self.colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn write_section(
        &mut self,
        title: &str,
        entries: &[(&TestSuite, &TestCase)],
        with_location: bool,
    ) -> io::Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        writeln!(self.out)?;
        writeln!(self.out, "{title}:")?;
        writeln!(self.out)?;
        for (index, (suite, case)) in entries.iter().enumerate() {
            writeln!(self.out, "   {}) {} {}", index + 1, suite.label(), case.description())?;
            if with_location {
                let location = format!("{DETAIL_INDENT}# {}", case.location().display_path());
                let location = self.paint(&location, CYAN);
                writeln!(self.out, "{location}")?;
            }
            for line in case.captured_output().lines() {
                writeln!(self.out, "{DETAIL_INDENT}{line}")?;
            }
        }
        Ok(())
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn on_case_complete(&mut self, case: &TestCase) -> io::Result<()> {
        let status = case.status();
        let Some(glyph) = status.progress_glyph() else {
            return Ok(());
        };
        let color = if status == CaseStatus::Passed { GREEN } else { RED };
        let glyph = self.paint(&glyph.to_string(), color);
        write!(self.out, "{glyph}")?;
        self.out.flush()
    }

    fn on_run_complete(&mut self, registry: &Registry, tally: &Tally) -> io::Result<()> {
        writeln!(self.out)?;

        self.write_section("Failures", &cases_with_status(registry, CaseStatus::Failed), false)?;
        self.write_section("Errors", &cases_with_status(registry, CaseStatus::Errored), true)?;

        writeln!(self.out)?;
        let color = if tally.is_clean() { GREEN } else { RED };
        let summary = self.paint(&tally.summary_line(), color);
        writeln!(self.out, "{summary}")?;
        self.out.flush()
    }
}

fn cases_with_status(registry: &Registry, wanted: CaseStatus) -> Vec<(&TestSuite, &TestCase)> {
    registry
        .iter_cases()
        .filter(|(_, case)| case.status() == wanted)
        .collect()
}

/// Print every registered case without running anything: `<suite> <case> (./file:line)`.
pub fn write_listing<W: Write>(out: &mut W, registry: &Registry) -> io::Result<()> {
    for (suite, case) in registry.iter_cases() {
        writeln!(
            out,
            "{} {} ({})",
            suite.label(),
            case.description(),
            case.location().display_path()
        )?;
    }
    out.flush()
}
