//! Run orchestration.
//!
//! Scenarios run sequentially and every case gets a fresh session from the
//! [`SessionLauncher`], so state such as login cookies never leaks from one
//! case into the next. A case that cannot even get a session fails on its own
//! and the run continues.

use crate::config::RunConfig;
use crate::driver::{BrowserDriver, SessionLauncher};
use crate::executor::ScenarioExecutor;
use crate::report::{CaseReport, FailureDetail, FailureMode, RunReport, ScenarioReport, TestStatus};
use crate::result::SkenarioResult;
use crate::scenario::{Scenario, TestCase, Variables};
use tokio::time::Instant;

/// Progress notifications emitted while a run is in flight
pub trait RunObserver {
    /// A scenario is about to run
    fn scenario_started(&mut self, _scenario: &Scenario) {}

    /// A case finished (or was skipped)
    fn case_finished(&mut self, _scenario: &Scenario, _case: &CaseReport) {}
}

/// Observer that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl RunObserver for SilentObserver {}

/// Runs scenarios against sessions from a launcher
#[derive(Debug)]
pub struct ScenarioRunner<L> {
    config: RunConfig,
    launcher: L,
    failure_mode: FailureMode,
}

impl<L: SessionLauncher> ScenarioRunner<L> {
    /// Create a runner
    #[must_use]
    pub fn new(config: RunConfig, launcher: L) -> Self {
        Self {
            config,
            launcher,
            failure_mode: FailureMode::default(),
        }
    }

    /// Set failure mode
    #[must_use]
    pub const fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    /// Stop after the first failed case
    #[must_use]
    pub const fn fail_fast(self) -> Self {
        self.with_failure_mode(FailureMode::AndonCord)
    }

    /// Get the run configuration
    #[must_use]
    pub const fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run every case of every scenario
    pub async fn run(&self, scenarios: &[Scenario]) -> SkenarioResult<RunReport> {
        self.run_with(scenarios, &mut SilentObserver).await
    }

    /// Run with progress notifications
    pub async fn run_with<O: RunObserver>(
        &self,
        scenarios: &[Scenario],
        observer: &mut O,
    ) -> SkenarioResult<RunReport> {
        let vars = Variables::new(self.config.variables())?;
        let executor = ScenarioExecutor::new(&self.config, &vars);
        let started = Instant::now();
        let mut report = RunReport::new();
        let mut halted = false;

        tracing::info!(run_id = %report.run_id, scenarios = scenarios.len(), "run started");
        for scenario in scenarios {
            observer.scenario_started(scenario);
            let mut cases = Vec::with_capacity(scenario.cases.len());
            for case in &scenario.cases {
                let result = if halted {
                    let descriptions: Vec<_> = case.steps.iter().map(|s| s.describe()).collect();
                    CaseReport::skipped(&case.name, &descriptions)
                } else {
                    self.run_case(&executor, scenario, case).await?
                };
                if result.status == TestStatus::Failed
                    && self.failure_mode == FailureMode::AndonCord
                {
                    tracing::warn!(case = %case.name, "stopping after first failure");
                    halted = true;
                }
                observer.case_finished(scenario, &result);
                cases.push(result);
            }
            report.push(ScenarioReport {
                name: scenario.name.clone(),
                file: scenario.source().display().to_string(),
                cases,
            });
        }
        report.duration_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            passed = report.totals.passed,
            failed = report.totals.failed,
            skipped = report.totals.skipped,
            "run finished"
        );
        Ok(report)
    }

    async fn run_case(
        &self,
        executor: &ScenarioExecutor<'_>,
        scenario: &Scenario,
        case: &TestCase,
    ) -> SkenarioResult<CaseReport> {
        let mut driver = match self.launcher.launch().await {
            Ok(driver) => driver,
            Err(err) => {
                tracing::warn!(case = %case.name, error = %err, "could not open a session");
                let descriptions: Vec<_> = case.steps.iter().map(|s| s.describe()).collect();
                let mut result = CaseReport::skipped(&case.name, &descriptions);
                result.status = TestStatus::Failed;
                result.expected_failure = case.expect_failure;
                result.failure = Some(FailureDetail {
                    file: scenario.source().display().to_string(),
                    case: case.name.clone(),
                    step_index: None,
                    step: None,
                    expected: "a browser session".to_string(),
                    observed: err.to_string(),
                    kind: Some(err.kind()),
                });
                return Ok(result);
            }
        };
        let result = executor.run_case(&mut driver, scenario, case).await;
        if let Err(err) = driver.close().await {
            tracing::debug!(error = %err, "session did not close cleanly");
        }
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::SessionLauncher;
    use crate::mock::{MockDriver, MockLauncher, MockSite};
    use crate::result::{ErrorKind, SkenarioError};
    use crate::scenario::Step;
    use async_trait::async_trait;

    const BASE: &str = "https://app.test/";

    fn config() -> RunConfig {
        RunConfig::new(BASE)
            .with_login("admin", "1234")
            .with_command_timeout(500)
            .with_poll_interval(50)
    }

    fn failing_case(name: &str) -> TestCase {
        TestCase::new(name)
            .with_step(Step::navigate("${base_url}"))
            .with_step(Step::assert_visible("never"))
    }

    fn passing_case(name: &str) -> TestCase {
        TestCase::new(name)
            .with_step(Step::navigate("${base_url}"))
            .with_step(Step::assert_visible("APPLIKASI BIZ"))
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl RunObserver for Recorder {
        fn scenario_started(&mut self, scenario: &Scenario) {
            self.events.push(format!("scenario:{}", scenario.name));
        }

        fn case_finished(&mut self, _scenario: &Scenario, case: &CaseReport) {
            self.events.push(format!("{}:{}", case.name, case.status));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_case_gets_fresh_session() {
        let launcher = MockLauncher::new(MockSite::login_app(BASE));
        let runner = ScenarioRunner::new(config(), launcher.clone());
        let scenario = Scenario::new("s")
            .with_case(passing_case("a"))
            .with_case(passing_case("b"));
        let report = runner.run(&[scenario]).await.unwrap();
        assert!(report.all_passed());
        assert_eq!(launcher.launch_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_does_not_stop_other_cases() {
        let runner = ScenarioRunner::new(config(), MockLauncher::new(MockSite::login_app(BASE)));
        let scenario = Scenario::new("s")
            .with_case(failing_case("a"))
            .with_case(passing_case("b"));
        let mut recorder = Recorder::default();
        let report = runner.run_with(&[scenario], &mut recorder).await.unwrap();
        assert_eq!(report.totals.failed, 1);
        assert_eq!(report.totals.passed, 1);
        assert_eq!(recorder.events, vec!["scenario:s", "a:failed", "b:passed"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_fast_skips_remaining() {
        let runner = ScenarioRunner::new(config(), MockLauncher::new(MockSite::login_app(BASE)))
            .fail_fast();
        let first = Scenario::new("first")
            .with_case(failing_case("a"))
            .with_case(passing_case("b"));
        let second = Scenario::new("second").with_case(passing_case("c"));
        let report = runner.run(&[first, second]).await.unwrap();
        assert_eq!(report.totals.failed, 1);
        assert_eq!(report.totals.skipped, 2);
        assert_eq!(report.scenarios[1].cases[0].status, TestStatus::Skipped);
    }

    #[derive(Debug)]
    struct BrokenLauncher;

    #[async_trait]
    impl SessionLauncher for BrokenLauncher {
        type Driver = MockDriver;

        async fn launch(&self) -> SkenarioResult<MockDriver> {
            Err(SkenarioError::BrowserLaunchError {
                message: "chromium not found".to_string(),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_launch_failure_fails_case() {
        let runner = ScenarioRunner::new(config(), BrokenLauncher);
        let scenario = Scenario::new("s").with_case(passing_case("a"));
        let report = runner.run(&[scenario]).await.unwrap();
        let case = &report.scenarios[0].cases[0];
        assert_eq!(case.status, TestStatus::Failed);
        let failure = case.failure.as_ref().unwrap();
        assert_eq!(failure.kind, Some(ErrorKind::Browser));
        assert!(failure.observed.contains("chromium not found"));
    }
}
