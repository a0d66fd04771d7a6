//! Running outcome counts for a harness run.

use crate::CaseStatus;

/// Counts of completed cases by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
}

impl Tally {
    /// Count one completed case. `Unrun` is ignored: only scheduled-and-finished cases are examples.
    pub fn record(&mut self, status: CaseStatus) {
        match status {
            CaseStatus::Unrun => {}
            CaseStatus::Passed => self.passed += 1,
            CaseStatus::Failed => self.failed += 1,
            CaseStatus::Errored => self.errored += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errored
    }

    /// Number of cases that did not pass.
    pub fn problems(&self) -> usize {
        self.failed + self.errored
    }

    pub fn is_clean(&self) -> bool {
        self.problems() == 0
    }

    /// The one-line summary text, e.g. `2 examples, 0 failures, 1 errors`.
    pub fn summary_line(&self) -> String {
        format!(
            "{} examples, {} failures, {} errors",
            self.total(),
            self.failed,
            self.errored
        )
    }
}

impl FromIterator<CaseStatus> for Tally {
    fn from_iter<I: IntoIterator<Item = CaseStatus>>(iter: I) -> Self {
        let mut tally = Tally::default();
        for status in iter {
            tally.record(status);
        }
        tally
    }
}
