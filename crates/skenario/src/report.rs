//! Run reports.
//!
//! ```text
//! RunReport (run_id, started_at, totals)
//!   └── ScenarioReport (name, file)
//!         └── CaseReport (status, expected failure, duration)
//!               ├── StepReport × n (index, description, status)
//!               └── FailureDetail (step, expected, observed, kind)
//! ```
//!
//! A report renders as JSON or as JUnit XML (one `<testsuite>` per scenario),
//! and can be written to a directory in either or both formats.

use crate::result::{ErrorKind, SkenarioResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// What to do after a failed case
///
/// Andon Cord: stop the line on first failure
/// CollectAll: run every case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Stop on first failed case; remaining cases are skipped
    AndonCord,
    /// Run every case regardless of failures
    #[default]
    CollectAll,
}

/// Status of a case or step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    /// Passed
    Passed,
    /// Failed
    Failed,
    /// Not executed
    Skipped,
}

impl TestStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if status is failing
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        })
    }
}

/// One executed (or skipped) step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// 1-based step number
    pub index: usize,
    /// Authored description
    pub description: String,
    /// Outcome
    pub status: TestStatus,
    /// Wall time in milliseconds
    pub duration_ms: u64,
}

/// Why a case failed, and where
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDetail {
    /// Scenario file
    pub file: String,
    /// Case name
    pub case: String,
    /// 1-based number of the failing step (None when the case failed as a whole)
    pub step_index: Option<usize>,
    /// Failing step description
    pub step: Option<String>,
    /// Expected condition
    pub expected: String,
    /// Observed state
    pub observed: String,
    /// Error classification
    pub kind: Option<ErrorKind>,
}

impl FailureDetail {
    /// `file › case › step N` location string
    #[must_use]
    pub fn location(&self) -> String {
        match self.step_index {
            Some(n) => format!("{} › {} › step {n}", self.file, self.case),
            None => format!("{} › {}", self.file, self.case),
        }
    }

    /// One-line message
    #[must_use]
    pub fn message(&self) -> String {
        let mut msg = String::new();
        if let Some(step) = &self.step {
            let _ = write!(msg, "{step}: ");
        }
        let _ = write!(msg, "expected {}, observed {}", self.expected, self.observed);
        if let Some(kind) = self.kind {
            let _ = write!(msg, " [{kind}]");
        }
        msg
    }
}

/// Result of one test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseReport {
    /// Case name
    pub name: String,
    /// Outcome after applying `expected_failure`
    pub status: TestStatus,
    /// Failure kind the case was expected to end with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_failure: Option<ErrorKind>,
    /// Wall time in milliseconds
    pub duration_ms: u64,
    /// Per-step results
    pub steps: Vec<StepReport>,
    /// Failure detail, present when the case failed (or failed as expected)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureDetail>,
}

impl CaseReport {
    /// A case that never ran
    #[must_use]
    pub fn skipped(name: impl Into<String>, descriptions: &[String]) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Skipped,
            expected_failure: None,
            duration_ms: 0,
            steps: descriptions
                .iter()
                .enumerate()
                .map(|(i, description)| StepReport {
                    index: i + 1,
                    description: description.clone(),
                    status: TestStatus::Skipped,
                    duration_ms: 0,
                })
                .collect(),
            failure: None,
        }
    }
}

/// Results for one scenario file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario name
    pub name: String,
    /// Source file
    pub file: String,
    /// Cases in file order
    pub cases: Vec<CaseReport>,
}

/// Case counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// All cases
    pub total: usize,
    /// Passed cases
    pub passed: usize,
    /// Failed cases
    pub failed: usize,
    /// Skipped cases
    pub skipped: usize,
}

/// Output format for [`RunReport::write_to`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// `report.json`
    Json,
    /// `junit.xml`
    Junit,
    /// Both files
    #[default]
    Both,
}

/// Everything that happened in one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique run identifier
    pub run_id: Uuid,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Wall time in milliseconds
    pub duration_ms: u64,
    /// Per-scenario results
    pub scenarios: Vec<ScenarioReport>,
    /// Case counts
    pub totals: Totals,
}

impl RunReport {
    /// Start an empty report
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            duration_ms: 0,
            scenarios: Vec::new(),
            totals: Totals::default(),
        }
    }

    /// Add a scenario's results and update the totals
    pub fn push(&mut self, scenario: ScenarioReport) {
        for case in &scenario.cases {
            self.totals.total += 1;
            match case.status {
                TestStatus::Passed => self.totals.passed += 1,
                TestStatus::Failed => self.totals.failed += 1,
                TestStatus::Skipped => self.totals.skipped += 1,
            }
        }
        self.scenarios.push(scenario);
    }

    /// True when no case failed
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.totals.failed == 0
    }

    /// Every failed case with its failure detail
    #[must_use]
    pub fn failures(&self) -> Vec<&CaseReport> {
        self.scenarios
            .iter()
            .flat_map(|s| s.cases.iter())
            .filter(|c| c.status.is_failed())
            .collect()
    }

    /// Summary line
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed, {} skipped ({} total) in {:.2}s",
            self.totals.passed,
            self.totals.failed,
            self.totals.skipped,
            self.totals.total,
            self.duration_ms as f64 / 1000.0
        )
    }

    /// Render as pretty JSON
    pub fn render_json(&self) -> SkenarioResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render as JUnit XML
    #[must_use]
    pub fn render_junit(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        let _ = writeln!(
            xml,
            r#"<testsuites name="skenario" tests="{}" failures="{}" skipped="{}" time="{:.3}">"#,
            self.totals.total,
            self.totals.failed,
            self.totals.skipped,
            self.duration_ms as f64 / 1000.0
        );

        for scenario in &self.scenarios {
            let failures = scenario.cases.iter().filter(|c| c.status.is_failed()).count();
            let time: u64 = scenario.cases.iter().map(|c| c.duration_ms).sum();
            let _ = writeln!(
                xml,
                r#"  <testsuite name="{}" file="{}" tests="{}" failures="{}" time="{:.3}">"#,
                escape_xml(&scenario.name),
                escape_xml(&scenario.file),
                scenario.cases.len(),
                failures,
                time as f64 / 1000.0
            );

            for case in &scenario.cases {
                let _ = write!(
                    xml,
                    r#"    <testcase name="{}" classname="{}" time="{:.3}""#,
                    escape_xml(&case.name),
                    escape_xml(&scenario.name),
                    case.duration_ms as f64 / 1000.0
                );
                match (case.status, &case.failure) {
                    (TestStatus::Failed, Some(failure)) => {
                        xml.push_str(">\n");
                        let kind = failure.kind.map_or("failure", ErrorKind::as_str);
                        let _ = writeln!(
                            xml,
                            r#"      <failure message="{}" type="{}">{}</failure>"#,
                            escape_xml(&failure.message()),
                            kind,
                            escape_xml(&failure.location())
                        );
                        xml.push_str("    </testcase>\n");
                    }
                    (TestStatus::Failed, None) => {
                        xml.push_str(">\n      <failure/>\n    </testcase>\n");
                    }
                    (TestStatus::Skipped, _) => {
                        xml.push_str(">\n      <skipped/>\n    </testcase>\n");
                    }
                    (TestStatus::Passed, _) => xml.push_str("/>\n"),
                }
            }
            xml.push_str("  </testsuite>\n");
        }

        xml.push_str("</testsuites>\n");
        xml
    }

    /// Write the report into `dir`, returning the files written
    pub fn write_to(&self, dir: &Path, format: ReportFormat) -> SkenarioResult<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::new();
        if matches!(format, ReportFormat::Json | ReportFormat::Both) {
            let path = dir.join("report.json");
            std::fs::write(&path, self.render_json()?)?;
            written.push(path);
        }
        if matches!(format, ReportFormat::Junit | ReportFormat::Both) {
            let path = dir.join("junit.xml");
            std::fs::write(&path, self.render_junit())?;
            written.push(path);
        }
        tracing::debug!(dir = %dir.display(), files = written.len(), "report written");
        Ok(written)
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn step(index: usize, status: TestStatus) -> StepReport {
        StepReport {
            index,
            description: format!("step {index}"),
            status,
            duration_ms: 5,
        }
    }

    fn failed_case() -> CaseReport {
        CaseReport {
            name: "logs in".to_string(),
            status: TestStatus::Failed,
            expected_failure: None,
            duration_ms: 10_050,
            steps: vec![
                step(1, TestStatus::Passed),
                step(2, TestStatus::Failed),
                step(3, TestStatus::Skipped),
            ],
            failure: Some(FailureDetail {
                file: "scenarios/login.yaml".to_string(),
                case: "logs in".to_string(),
                step_index: Some(2),
                step: Some("expect URL to contain \"/home\"".to_string()),
                expected: "URL to contain \"/home\"".to_string(),
                observed: "https://app.test/".to_string(),
                kind: Some(ErrorKind::AssertionTimeout),
            }),
        }
    }

    fn passed_case() -> CaseReport {
        CaseReport {
            name: "opens <login>".to_string(),
            status: TestStatus::Passed,
            expected_failure: None,
            duration_ms: 120,
            steps: vec![step(1, TestStatus::Passed)],
            failure: None,
        }
    }

    fn report() -> RunReport {
        let mut report = RunReport::new();
        report.push(ScenarioReport {
            name: "Login".to_string(),
            file: "scenarios/login.yaml".to_string(),
            cases: vec![
                passed_case(),
                failed_case(),
                CaseReport::skipped("later", &["navigate to /".to_string()]),
            ],
        });
        report
    }

    mod status_tests {
        use super::*;

        #[test]
        fn test_status_predicates() {
            assert!(TestStatus::Passed.is_passed());
            assert!(TestStatus::Failed.is_failed());
            assert!(!TestStatus::Skipped.is_passed());
            assert!(!TestStatus::Skipped.is_failed());
        }

        #[test]
        fn test_default_failure_mode_collects_all() {
            assert_eq!(FailureMode::default(), FailureMode::CollectAll);
        }
    }

    mod totals_tests {
        use super::*;

        #[test]
        fn test_totals() {
            let report = report();
            assert_eq!(
                report.totals,
                Totals {
                    total: 3,
                    passed: 1,
                    failed: 1,
                    skipped: 1
                }
            );
            assert!(!report.all_passed());
            assert_eq!(report.failures().len(), 1);
            assert!(report.summary().starts_with("1 passed, 1 failed, 1 skipped"));
        }

        #[test]
        fn test_empty_report_passes() {
            assert!(RunReport::new().all_passed());
        }

        #[test]
        fn test_skipped_case_lists_steps() {
            let case = CaseReport::skipped("x", &["a".to_string(), "b".to_string()]);
            assert_eq!(case.steps.len(), 2);
            assert_eq!(case.steps[1].index, 2);
            assert!(case.steps.iter().all(|s| s.status == TestStatus::Skipped));
        }
    }

    mod failure_detail_tests {
        use super::*;

        #[test]
        fn test_location_and_message() {
            let failure = failed_case().failure.unwrap();
            assert_eq!(failure.location(), "scenarios/login.yaml › logs in › step 2");
            let msg = failure.message();
            assert!(msg.contains("expected URL to contain \"/home\""));
            assert!(msg.contains("observed https://app.test/"));
            assert!(msg.ends_with("[assertion_timeout]"));
        }
    }

    mod render_tests {
        use super::*;

        #[test]
        fn test_json_round_trips() {
            let report = report();
            let json = report.render_json().unwrap();
            assert!(json.contains("\"assertion_timeout\""));
            let parsed: RunReport = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, report);
        }

        #[test]
        fn test_junit_structure() {
            let xml = report().render_junit();
            assert!(xml.starts_with("<?xml"));
            assert!(xml.contains(r#"<testsuites name="skenario" tests="3" failures="1" skipped="1""#));
            assert!(xml.contains(r#"<testsuite name="Login" file="scenarios/login.yaml" tests="3" failures="1""#));
            assert!(xml.contains(r#"type="assertion_timeout""#));
            assert!(xml.contains("<skipped/>"));
            assert!(xml.contains("opens &lt;login&gt;"));
            assert!(xml.trim_end().ends_with("</testsuites>"));
        }

        #[test]
        fn test_escape_xml() {
            assert_eq!(escape_xml(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&apos;");
        }

        #[test]
        fn test_write_to_both() {
            let dir = tempfile::tempdir().unwrap();
            let out = dir.path().join("reports");
            let files = report().write_to(&out, ReportFormat::Both).unwrap();
            assert_eq!(files.len(), 2);
            assert!(out.join("report.json").exists());
            assert!(out.join("junit.xml").exists());
        }

        #[test]
        fn test_write_to_json_only() {
            let dir = tempfile::tempdir().unwrap();
            let files = report().write_to(dir.path(), ReportFormat::Json).unwrap();
            assert_eq!(files, vec![dir.path().join("report.json")]);
        }
    }
}
