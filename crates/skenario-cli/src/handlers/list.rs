//! List and validate command handlers

use crate::commands::{ListArgs, SourceArgs};
use crate::error::CliResult;
use crate::runner::load_run_config;
use skenario::{load_scenarios, Scenario};
use std::fmt::Write as _;

/// Execute the list command
pub fn execute_list(args: &ListArgs) -> CliResult<()> {
    let config = load_run_config(&args.source, args.source.overrides())?;
    let scenarios = load_scenarios(&config, args.filter.as_deref())?;
    print!("{}", render_listing(&scenarios));
    Ok(())
}

/// Execute the validate command, returning a one-line verdict
pub fn execute_validate(source: &SourceArgs) -> CliResult<String> {
    let config = load_run_config(source, source.overrides())?;
    let scenarios = load_scenarios(&config, None)?;
    Ok(validation_summary(&scenarios))
}

/// One block per scenario: its file, then each case and step count
#[must_use]
pub fn render_listing(scenarios: &[Scenario]) -> String {
    let mut out = String::new();
    for scenario in scenarios {
        let _ = writeln!(out, "{} ({})", scenario.name, scenario.source().display());
        for case in &scenario.cases {
            let _ = write!(out, "  - {} [{} step(s)", case.name, case.steps.len());
            if let Some(kind) = case.expect_failure {
                let _ = write!(out, ", expects {kind}");
            }
            let _ = writeln!(out, "]");
        }
    }
    if scenarios.is_empty() {
        out.push_str("No scenarios found\n");
    }
    out
}

/// Summary printed by `validate`
#[must_use]
pub fn validation_summary(scenarios: &[Scenario]) -> String {
    let cases: usize = scenarios.iter().map(|s| s.cases.len()).sum();
    let steps: usize = scenarios
        .iter()
        .flat_map(|s| &s.cases)
        .map(|c| c.steps.len())
        .sum();
    format!(
        "OK: {} scenario file(s), {cases} case(s), {steps} step(s)",
        scenarios.len()
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use skenario::{ErrorKind, Step, TestCase};

    fn scenarios() -> Vec<Scenario> {
        vec![Scenario::new("Login")
            .with_source("scenarios/login.yaml")
            .with_case(
                TestCase::new("logs in")
                    .with_step(Step::navigate("/"))
                    .with_step(Step::assert_visible("DASHBOARD")),
            )
            .with_case(
                TestCase::new("rejects bad password")
                    .with_step(Step::assert_url_contains("/home"))
                    .expecting_failure(ErrorKind::AssertionTimeout),
            )]
    }

    #[test]
    fn test_listing() {
        let listing = render_listing(&scenarios());
        assert!(listing.starts_with("Login (scenarios/login.yaml)\n"));
        assert!(listing.contains("  - logs in [2 step(s)]\n"));
        assert!(listing.contains("expects assertion_timeout"));
    }

    #[test]
    fn test_empty_listing() {
        assert_eq!(render_listing(&[]), "No scenarios found\n");
    }

    #[test]
    fn test_validation_summary() {
        assert_eq!(
            validation_summary(&scenarios()),
            "OK: 1 scenario file(s), 2 case(s), 3 step(s)"
        );
    }
}
