//! Test registry: ordered suites of ordered test cases.
//!
//! The registry is filled by explicit registration calls before a run starts and is only read afterwards, apart
//! from each case's result which the executor records once.
//!
//! ## Ordering
//!
//! Suite order and case order are insertion order. Both drive execution order and report order, so two runs of
//! the same registry produce the same output.
//!
//! ## Active suite
//!
//! `register_case` appends to the *active* suite: the most recently registered suite, or the default suite
//! (reported as "It") when no suite has been opened yet.

use std::fmt;
use std::panic::Location;
use std::str::FromStr;

use isotest_core::{CaseStatus, SourceLocation, Termination};

use crate::error::{HarnessError, HarnessResult};

/// Label used in reports for cases of the default suite.
pub const DEFAULT_SUITE_LABEL: &str = "It";

/// The callable part of a test case.
pub type TestBody = Box<dyn Fn() + 'static>;

/// A single named unit of test logic.
pub struct TestCase {
    description: String,
    location: SourceLocation,
    body: TestBody,
    status: CaseStatus,
    termination: Option<Termination>,
    captured_output: String,
}

impl TestCase {
    /// Declare a case, capturing the caller's source location.
    #[track_caller]
    pub fn new(description: impl Into<String>, body: impl Fn() + 'static) -> Self {
        Self::at(description, Location::caller().into(), body)
    }

    /// Declare a case at an explicit location (for declaration layers that track locations themselves).
    pub fn at(description: impl Into<String>, location: SourceLocation, body: impl Fn() + 'static) -> Self {
        Self {
            description: description.into(),
            location,
            body: Box::new(body),
            status: CaseStatus::Unrun,
            termination: None,
            captured_output: String::new(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn status(&self) -> CaseStatus {
        self.status
    }

    /// How the case's child ended, once recorded.
    pub fn termination(&self) -> Option<&Termination> {
        self.termination.as_ref()
    }

    pub fn captured_output(&self) -> &str {
        &self.captured_output
    }

    /// Run the body in the current process. Only the isolated child should call this.
    pub fn run(&self) {
        (self.body)()
    }

    /// Record the case's result. The transition out of `Unrun` happens exactly once.
    ///
    /// ## Errors
    /// - `HarnessError::AlreadyRecorded` if a result was recorded before.
    pub fn record(&mut self, termination: Termination, captured_output: String) -> HarnessResult<CaseStatus> {
        if self.status.is_terminal() {
            return Err(HarnessError::AlreadyRecorded {
                description: self.description.clone(),
            });
        }
        self.status = termination.status();
        self.termination = Some(termination);
        self.captured_output = captured_output;
        Ok(self.status)
    }

    fn same_declaration(&self, other: &TestCase) -> bool {
        self.description == other.description && self.location == other.location
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("description", &self.description)
            .field("location", &self.location)
            .field("status", &self.status)
            .field("termination", &self.termination)
            .field("captured_output", &self.captured_output)
            .finish_non_exhaustive()
    }
}

/// A named, ordered grouping of test cases.
#[derive(Debug, Default)]
pub struct TestSuite {
    description: Option<String>,
    location: Option<SourceLocation>,
    cases: Vec<TestCase>,
}

impl TestSuite {
    /// Declare a suite, capturing the caller's source location.
    #[track_caller]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            location: Some(Location::caller().into()),
            cases: Vec::new(),
        }
    }

    /// Attach a case before the suite is registered.
    pub fn with_case(mut self, case: TestCase) -> Self {
        self.cases.push(case);
        self
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The label printed in reports: the description, or "It" for the default suite.
    pub fn label(&self) -> &str {
        self.description.as_deref().unwrap_or(DEFAULT_SUITE_LABEL)
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    fn same_declaration(&self, other: &TestSuite) -> bool {
        self.description == other.description && self.location == other.location
    }
}

/// Address of one case inside a registry: zero-based suite and case indices.
///
/// The text form `<suite>:<case>` is how the parent tells an isolated child which case to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaseSelector {
    pub suite: usize,
    pub case: usize,
}

impl CaseSelector {
    pub fn new(suite: usize, case: usize) -> Self {
        Self { suite, case }
    }
}

impl fmt::Display for CaseSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.suite, self.case)
    }
}

impl FromStr for CaseSelector {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || HarnessError::InvalidSelector(s.to_string());
        let (suite, case) = s.split_once(':').ok_or_else(invalid)?;
        let suite = suite.parse().map_err(|_| invalid())?;
        let case = case.parse().map_err(|_| invalid())?;
        Ok(Self { suite, case })
    }
}

/// Ordered collection of suites, starting with the default suite.
#[derive(Debug)]
pub struct Registry {
    suites: Vec<TestSuite>,
    active: usize,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a registry holding only the (empty) default suite, which is active.
    pub fn new() -> Self {
        Self {
            suites: vec![TestSuite::default()],
            active: 0,
        }
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Append a suite and make it the active one.
    ///
    /// Cases already attached to `suite` are registered in order afterwards. Registering the same declaration
    /// again re-activates the existing suite instead of adding a duplicate.
    ///
    /// ## Returns
    /// - (`usize`): index of the suite now active.
    pub fn register_suite(&mut self, mut suite: TestSuite) -> usize {
        let cases = std::mem::take(&mut suite.cases);
        let index = match self.suites.iter().position(|existing| existing.same_declaration(&suite)) {
            Some(index) => {
                tracing::debug!(suite = suite.label(), "suite redeclared; reusing existing entry");
                index
            }
            None => {
                self.suites.push(suite);
                self.suites.len() - 1
            }
        };
        self.active = index;
        for case in cases {
            self.register_case(case);
        }
        index
    }

    /// Append a case to the active suite.
    ///
    /// ## Returns
    /// - (`bool`): `false` if the same declaration (description and location) was already registered; the
    ///   redeclared case is dropped.
    pub fn register_case(&mut self, case: TestCase) -> bool {
        let redeclared = self
            .suites
            .iter()
            .flat_map(|suite| suite.cases.iter())
            .any(|existing| existing.same_declaration(&case));
        if redeclared {
            tracing::warn!(
                case = case.description(),
                location = %case.location(),
                "ignoring duplicate registration"
            );
            return false;
        }
        self.suites[self.active].cases.push(case);
        true
    }

    pub fn suites(&self) -> &[TestSuite] {
        &self.suites
    }

    pub fn suite(&self, index: usize) -> Option<&TestSuite> {
        self.suites.get(index)
    }

    pub fn case(&self, selector: CaseSelector) -> Option<&TestCase> {
        self.suites.get(selector.suite)?.cases.get(selector.case)
    }

    pub fn case_mut(&mut self, selector: CaseSelector) -> Option<&mut TestCase> {
        self.suites.get_mut(selector.suite)?.cases.get_mut(selector.case)
    }

    pub fn case_count(&self) -> usize {
        self.suites.iter().map(|suite| suite.cases.len()).sum()
    }

    /// Every case address in traversal order: suite-major, case-minor.
    pub fn selectors(&self) -> impl Iterator<Item = CaseSelector> + '_ {
        self.suites
            .iter()
            .enumerate()
            .flat_map(|(suite, s)| (0..s.cases.len()).map(move |case| CaseSelector::new(suite, case)))
    }

    /// Every case with its suite, in traversal order.
    pub fn iter_cases(&self) -> impl Iterator<Item = (&TestSuite, &TestCase)> + '_ {
        self.suites
            .iter()
            .flat_map(|suite| suite.cases.iter().map(move |case| (suite, case)))
    }
}

/// Linear builder over [`Registry`]: `.suite()` opens a suite, `.case()` adds to the most recently opened one.
///
/// ```rust
/// use isotest::registry::Registry;
///
/// let registry = Registry::builder()
///     .case("starts empty", || assert!(Vec::<u8>::new().is_empty()))
///     .suite("Math")
///     .case("adds", || assert_eq!(1 + 1, 2))
///     .build();
///
/// assert_eq!(registry.case_count(), 2);
/// assert_eq!(registry.suites()[1].label(), "Math");
/// ```
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    #[track_caller]
    pub fn suite(mut self, description: impl Into<String>) -> Self {
        self.registry.register_suite(TestSuite::new(description));
        self
    }

    #[track_caller]
    pub fn case(mut self, description: impl Into<String>, body: impl Fn() + 'static) -> Self {
        self.registry.register_case(TestCase::new(description, body));
        self
    }

    pub fn build(self) -> Registry {
        self.registry
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn labels(registry: &Registry) -> Vec<(String, String)> {
        registry
            .iter_cases()
            .map(|(suite, case)| (suite.label().to_string(), case.description().to_string()))
            .collect()
    }

    #[test]
    fn test_new_registry_has_empty_default_suite() {
        let registry = Registry::new();
        assert_eq!(registry.suites().len(), 1);
        assert_eq!(registry.suites()[0].label(), DEFAULT_SUITE_LABEL);
        assert_eq!(registry.case_count(), 0);
        assert_eq!(registry.selectors().count(), 0);
    }

    #[test]
    fn test_cases_before_any_suite_go_to_default() {
        let registry = Registry::builder().case("a", || {}).case("b", || {}).build();
        assert_eq!(
            labels(&registry),
            vec![("It".to_string(), "a".to_string()), ("It".to_string(), "b".to_string())]
        );
    }

    #[test]
    fn test_cases_follow_most_recent_suite() {
        let registry = Registry::builder()
            .case("loose", || {})
            .suite("Math")
            .case("adds", || {})
            .case("divides", || {})
            .suite("Strings")
            .case("concats", || {})
            .build();

        assert_eq!(
            labels(&registry),
            vec![
                ("It".to_string(), "loose".to_string()),
                ("Math".to_string(), "adds".to_string()),
                ("Math".to_string(), "divides".to_string()),
                ("Strings".to_string(), "concats".to_string()),
            ]
        );
        let selectors: Vec<_> = registry.selectors().collect();
        assert_eq!(
            selectors,
            vec![
                CaseSelector::new(0, 0),
                CaseSelector::new(1, 0),
                CaseSelector::new(1, 1),
                CaseSelector::new(2, 0),
            ]
        );
    }

    #[test]
    fn test_redeclared_case_is_ignored() {
        let mut registry = Registry::new();
        let location = SourceLocation::new("tests/dup.rs", 3);
        assert!(registry.register_case(TestCase::at("once", location.clone(), || {})));
        assert!(!registry.register_case(TestCase::at("once", location, || {})));
        assert_eq!(registry.case_count(), 1);
    }

    #[test]
    fn test_same_description_at_other_location_is_distinct() {
        let mut registry = Registry::new();
        assert!(registry.register_case(TestCase::at("same", SourceLocation::new("a.rs", 1), || {})));
        assert!(registry.register_case(TestCase::at("same", SourceLocation::new("a.rs", 2), || {})));
        assert_eq!(registry.case_count(), 2);
    }

    #[test]
    fn test_redeclared_suite_is_reactivated() {
        let mut registry = Registry::new();
        let declare = || TestSuite::new("Math");
        let first = registry.register_suite(declare());
        registry.register_suite(TestSuite::new("Other"));
        let again = registry.register_suite(declare());
        assert_eq!(first, again);
        assert_eq!(registry.suites().len(), 3);

        registry.register_case(TestCase::new("late", || {}));
        assert_eq!(registry.suite(first).unwrap().cases().len(), 1);
    }

    #[test]
    fn test_register_suite_with_attached_cases() {
        let mut registry = Registry::new();
        let suite = TestSuite::new("Math")
            .with_case(TestCase::new("adds", || {}))
            .with_case(TestCase::new("subtracts", || {}));
        let index = registry.register_suite(suite);
        assert_eq!(index, 1);
        let names: Vec<_> = registry.suites()[1].cases().iter().map(TestCase::description).collect();
        assert_eq!(names, vec!["adds", "subtracts"]);
    }

    #[test]
    fn test_location_is_captured_at_call_site() {
        let line = line!() + 1;
        let registry = Registry::builder().case("here", || {}).build();
        let case = registry.case(CaseSelector::new(0, 0)).unwrap();
        assert_eq!(case.location().line, line);
        assert!(case.location().file.ends_with("registry.rs"));
    }

    #[test]
    fn test_record_is_one_way() {
        let mut case = TestCase::new("once", || {});
        assert_eq!(case.status(), CaseStatus::Unrun);
        let status = case.record(Termination::Exited(0), "out".to_string()).unwrap();
        assert_eq!(status, CaseStatus::Passed);
        assert_eq!(case.captured_output(), "out");

        let err = case.record(Termination::Exited(1), String::new()).unwrap_err();
        assert!(matches!(err, HarnessError::AlreadyRecorded { .. }));
        assert_eq!(case.status(), CaseStatus::Passed);
        assert_eq!(case.captured_output(), "out");
    }

    #[test]
    fn test_selector_text_form() {
        let selector: CaseSelector = "2:13".parse().unwrap();
        assert_eq!(selector, CaseSelector::new(2, 13));
        assert_eq!(selector.to_string(), "2:13");

        for bad in ["", "1", "1:", ":1", "a:b", "1:2:3", "-1:0"] {
            assert!(bad.parse::<CaseSelector>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_case_lookup_out_of_range() {
        let registry = Registry::builder().case("only", || {}).build();
        assert!(registry.case(CaseSelector::new(0, 1)).is_none());
        assert!(registry.case(CaseSelector::new(5, 0)).is_none());
    }
}
