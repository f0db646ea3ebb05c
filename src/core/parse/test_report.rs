//! Test-summary parsing per framework grammar.

use serde::Serialize;

use crate::tool::TestFramework;
use crate::utils::parser::{extract_count, extract_float, extract_groups};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TestReport {
    pub tests_total: u32,
    pub tests_passed: u32,
    pub tests_failed: u32,
    pub tests_skipped: u32,
    pub coverage_percentage: Option<f64>,
    pub duration_seconds: Option<f64>,
}

pub fn parse(framework: TestFramework, output: &str) -> TestReport {
    match framework {
        TestFramework::Maven | TestFramework::Gradle => parse_surefire(output),
        TestFramework::Pytest => parse_pytest(output),
        TestFramework::Jest => parse_jest(output),
        TestFramework::GoTest => parse_gotest(output),
    }
}

/// JUnit/TestNG summary: `Tests run: 5, Failures: 1, Errors: 1, Skipped: 0`.
/// Failed = failures + errors; passed = run - failed - skipped.
fn parse_surefire(output: &str) -> TestReport {
    let mut report = TestReport::default();

    if let Some(groups) = extract_groups(
        output,
        r"Tests run: (\d+), Failures: (\d+), Errors: (\d+), Skipped: (\d+)",
    ) {
        let nums: Vec<u32> = groups.iter().filter_map(|s| s.parse().ok()).collect();
        if let [run, failures, errors, skipped] = nums[..] {
            report.tests_total = run;
            report.tests_failed = failures + errors;
            report.tests_skipped = skipped;
            report.tests_passed = run.saturating_sub(report.tests_failed + skipped);
        }
    }

    report
}

/// pytest summary: `12 passed, 2 failed, 1 skipped`, coverage `TOTAL ... 85%`,
/// duration `in 3.21s`.
fn parse_pytest(output: &str) -> TestReport {
    let passed = extract_count(output, r"(\d+) passed");
    let failed = extract_count(output, r"(\d+) failed");
    let skipped = extract_count(output, r"(\d+) skipped");

    TestReport {
        tests_total: passed + failed + skipped,
        tests_passed: passed,
        tests_failed: failed,
        tests_skipped: skipped,
        coverage_percentage: extract_float(output, r"TOTAL.*?(\d+)%"),
        duration_seconds: extract_float(output, r"in ([\d.]+)s"),
    }
}

/// Jest summary: `Tests:       5 passed, 5 total`, coverage table row
/// `All files | 85.5 | ...`, duration `Time:        4.2 s`.
fn parse_jest(output: &str) -> TestReport {
    let mut report = TestReport::default();

    if let Some(groups) = extract_groups(output, r"Tests:\s+(\d+) passed.*?(\d+) total") {
        let nums: Vec<u32> = groups.iter().filter_map(|s| s.parse().ok()).collect();
        if let [passed, total] = nums[..] {
            report.tests_passed = passed;
            report.tests_total = total;
            report.tests_failed = total.saturating_sub(passed);
        }
    }

    report.coverage_percentage = extract_float(output, r"All files\s+\|\s+([\d.]+)");
    report.duration_seconds = extract_float(output, r"Time:\s+([\d.]+) s");
    report
}

/// Go test output has no aggregate count line; package `ok` lines stand in
/// for passes, and any FAIL collapses to a single failure.
fn parse_gotest(output: &str) -> TestReport {
    let mut report = TestReport::default();

    if output.contains("PASS") {
        let ok_count = output.matches("\tok\t").count() as u32;
        report.tests_passed = ok_count;
        report.tests_total = ok_count;
    } else if output.contains("FAIL") {
        report.tests_failed = 1;
        report.tests_total = 1;
    }

    report
}
