//! Property-based tests for registry ordering and report counts
//!
//! These tests record outcomes directly on cases (as the executor would) so they can explore many registry
//! shapes without spawning processes.

use isotest::registry::TestSuite;
use isotest::{CaseStatus, ConsoleReporter, Registry, Reporter, SourceLocation, Tally, TestCase, Termination};
use proptest::prelude::*;

/// Exit codes stand in for outcomes: 0 passes, 1..=3 fail, 4 is a signal death.
fn termination_for(code: u8) -> Termination {
    match code {
        4 => Termination::Signaled(11),
        code => Termination::Exited(i32::from(code)),
    }
}

fn build(shape: &[Vec<u8>]) -> Registry {
    let mut registry = Registry::new();
    for (suite_index, cases) in shape.iter().enumerate() {
        let mut suite = TestSuite::new(format!("Suite{suite_index}"));
        for case_index in 0..cases.len() {
            let location = SourceLocation::new(format!("tests/suite_{suite_index}.rs"), case_index as u32 + 1);
            suite = suite.with_case(TestCase::at(format!("case {case_index}"), location, || {}));
        }
        registry.register_suite(suite);
    }
    registry
}

fn run_report(registry: &mut Registry, codes: &[u8]) -> (Tally, String) {
    let mut out = Vec::new();
    let mut reporter = ConsoleReporter::new(&mut out, false);
    let selectors: Vec<_> = registry.selectors().collect();
    reporter.on_run_start(selectors.len()).unwrap();
    let mut tally = Tally::default();
    for (selector, code) in selectors.into_iter().zip(codes) {
        let case = registry.case_mut(selector).unwrap();
        tally.record(case.record(termination_for(*code), String::new()).unwrap());
        reporter.on_case_complete(case).unwrap();
    }
    reporter.on_run_complete(registry, &tally).unwrap();
    (tally, String::from_utf8(out).unwrap())
}

fn shape_strategy() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(0u8..=4, 0..6), 0..5)
}

proptest! {
    /// Property: every registered case is counted exactly once and gets exactly one progress glyph, in order
    #[test]
    fn report_counts_and_orders_every_case(shape in shape_strategy()) {
        let mut registry = build(&shape);
        let codes: Vec<u8> = shape.iter().flatten().copied().collect();
        let (tally, report) = run_report(&mut registry, &codes);

        prop_assert_eq!(tally.total(), codes.len());
        prop_assert_eq!(registry.case_count(), codes.len());

        let progress = report.lines().next().unwrap_or("");
        let expected: String = codes
            .iter()
            .map(|code| termination_for(*code).status().progress_glyph().unwrap())
            .collect();
        prop_assert_eq!(progress, expected.as_str());

        let summary = format!(
            "{} examples, {} failures, {} errors",
            codes.len(),
            codes.iter().filter(|c| (1..=3).contains(*c)).count(),
            codes.iter().filter(|c| **c == 4).count(),
        );
        let expected_tail = format!("{summary}\n");
        prop_assert!(report.ends_with(&expected_tail));
    }

    /// Property: failure and error entries are numbered from 1 in registry order
    #[test]
    fn sections_are_numbered_in_registry_order(shape in shape_strategy()) {
        let mut registry = build(&shape);
        let codes: Vec<u8> = shape.iter().flatten().copied().collect();
        let (_, report) = run_report(&mut registry, &codes);

        let expected_failures: Vec<String> = registry
            .iter_cases()
            .filter(|(_, case)| case.status() == CaseStatus::Failed)
            .enumerate()
            .map(|(i, (suite, case))| format!("   {}) {} {}", i + 1, suite.label(), case.description()))
            .collect();
        let listed_failures: Vec<&str> = report
            .split("Errors:")
            .next()
            .unwrap_or("")
            .lines()
            .filter(|line| line.starts_with("   ") && line.contains(") "))
            .collect();
        prop_assert_eq!(listed_failures, expected_failures.iter().map(String::as_str).collect::<Vec<_>>());
    }

    /// Property: identical inputs render identical reports
    #[test]
    fn report_is_deterministic(shape in shape_strategy()) {
        let codes: Vec<u8> = shape.iter().flatten().copied().collect();
        let (_, first) = run_report(&mut build(&shape), &codes);
        let (_, second) = run_report(&mut build(&shape), &codes);
        prop_assert_eq!(first, second);
    }

    /// Property: redeclarations are dropped and first-declaration order is kept
    #[test]
    fn redeclarations_are_ignored(declarations in prop::collection::vec((0u8..4, 1u32..4), 0..20)) {
        let mut registry = Registry::new();
        let mut expected: Vec<(u8, u32)> = Vec::new();
        for (name, line) in &declarations {
            let case = TestCase::at(format!("case {name}"), SourceLocation::new("tests/dup.rs", *line), || {});
            let inserted = registry.register_case(case);
            let first_time = !expected.contains(&(*name, *line));
            prop_assert_eq!(inserted, first_time);
            if first_time {
                expected.push((*name, *line));
            }
        }

        let registered: Vec<(String, u32)> = registry
            .iter_cases()
            .map(|(_, case)| (case.description().to_string(), case.location().line))
            .collect();
        let expected: Vec<(String, u32)> = expected
            .into_iter()
            .map(|(name, line)| (format!("case {name}"), line))
            .collect();
        prop_assert_eq!(registered, expected);
    }
}
