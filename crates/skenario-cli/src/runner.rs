//! Scenario run orchestration for the CLI

use crate::commands::{RunArgs, SourceArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use skenario::{
    load_scenarios, ConfigOverrides, FailureMode, RunConfig, RunReport, Scenario, ScenarioRunner,
    SessionLauncher,
};

/// Load the configuration file and apply overrides.
///
/// A missing file is accepted when the base URL comes from a flag or the
/// environment; every other value then takes its default.
pub fn load_run_config(source: &SourceArgs, overrides: ConfigOverrides) -> CliResult<RunConfig> {
    let config = if source.config.is_file() {
        RunConfig::from_file(&source.config)?
    } else if let Some(base_url) = overrides.base_url.clone() {
        tracing::debug!(path = %source.config.display(), "no configuration file, using defaults");
        RunConfig::new(base_url)
    } else {
        return Err(CliError::config(format!(
            "{} not found (run `skenario init` or pass --base-url)",
            source.config.display()
        )));
    };
    let config = config.with_overrides(overrides);
    config.validate()?;
    Ok(config)
}

/// Runs scenarios and writes reports
#[derive(Debug)]
pub struct TestRunner {
    config: CliConfig,
    reporter: ProgressReporter,
}

impl TestRunner {
    /// Create a new test runner
    #[must_use]
    pub fn new(config: CliConfig) -> Self {
        let reporter =
            ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet())
                .with_steps(config.verbosity.is_verbose());
        Self { config, reporter }
    }

    /// Get the CLI configuration
    #[must_use]
    pub const fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Discover scenarios and run them in Chromium
    pub fn run(&mut self, args: &RunArgs) -> CliResult<RunReport> {
        let run_config = load_run_config(&args.source, args.overrides())?;
        let scenarios = self.discover(&run_config, args.filter.as_deref())?;

        #[cfg(feature = "browser")]
        {
            let launcher = skenario::ChromiumLauncher::new(run_config.browser.clone());
            self.execute(run_config, launcher, &scenarios, args)
        }
        #[cfg(not(feature = "browser"))]
        {
            let _ = (run_config, scenarios);
            Err(CliError::test_execution(
                "this build has no browser support; rebuild with --features browser",
            ))
        }
    }

    /// Load scenarios, failing when nothing matches
    pub fn discover(&self, config: &RunConfig, filter: Option<&str>) -> CliResult<Vec<Scenario>> {
        let scenarios = load_scenarios(config, filter)?;
        if scenarios.is_empty() {
            return Err(match filter {
                Some(f) => CliError::invalid_argument(format!("no case name contains {f:?}")),
                None => CliError::config(format!(
                    "no scenario files match {} under {}",
                    config.spec_pattern,
                    config.root().display()
                )),
            });
        }
        Ok(scenarios)
    }

    /// Run `scenarios` with sessions from `launcher`, then write reports
    pub fn execute<L: SessionLauncher>(
        &mut self,
        run_config: RunConfig,
        launcher: L,
        scenarios: &[Scenario],
        args: &RunArgs,
    ) -> CliResult<RunReport> {
        let total: usize = scenarios.iter().map(|s| s.cases.len()).sum();
        let mode = if args.fail_fast {
            FailureMode::AndonCord
        } else {
            FailureMode::CollectAll
        };
        self.reporter.info(&format!(
            "Running {total} case(s) from {} scenario file(s) against {}",
            scenarios.len(),
            run_config.base_url
        ));

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let runner = ScenarioRunner::new(run_config, launcher).with_failure_mode(mode);

        self.reporter.start_progress(total as u64, "cases");
        let result = runtime.block_on(runner.run_with(scenarios, &mut self.reporter));
        self.reporter.finish();
        let report = result?;
        if report.totals.skipped > 0 {
            self.reporter.warning(&format!(
                "stopped after the first failure; {} case(s) skipped",
                report.totals.skipped
            ));
        }

        let written = report
            .write_to(&args.report_dir, args.format.into())
            .map_err(|e| CliError::report_generation(e.to_string()))?;
        for path in &written {
            self.reporter.info(&format!("Report: {}", path.display()));
        }
        self.reporter.report_summary(&report);
        Ok(report)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::commands::ReportFormatArg;
    use crate::config::{ColorChoice, Verbosity};
    use skenario::{MockLauncher, MockSite, Step, TestCase};
    use std::path::{Path, PathBuf};

    const BASE: &str = "https://app.test/";

    fn source(config: &Path) -> SourceArgs {
        SourceArgs {
            config: config.to_path_buf(),
            ..SourceArgs::default()
        }
    }

    fn run_args(report_dir: PathBuf) -> RunArgs {
        RunArgs {
            source: SourceArgs::default(),
            filter: None,
            headed: false,
            chromium_path: None,
            no_sandbox: false,
            fail_fast: false,
            report_dir,
            format: ReportFormatArg::Both,
        }
    }

    fn quiet_runner() -> TestRunner {
        TestRunner::new(
            CliConfig::new()
                .with_verbosity(Verbosity::Quiet)
                .with_color(ColorChoice::Never),
        )
    }

    mod load_config_tests {
        use super::*;

        #[test]
        fn test_missing_file_without_base_url() {
            let dir = tempfile::tempdir().unwrap();
            let missing = source(&dir.path().join("none.yaml"));
            let err = load_run_config(&missing, ConfigOverrides::default()).unwrap_err();
            assert!(err.to_string().contains("skenario init"));
        }

        #[test]
        fn test_missing_file_with_base_url() {
            let dir = tempfile::tempdir().unwrap();
            let overrides = ConfigOverrides {
                base_url: Some(BASE.to_string()),
                ..ConfigOverrides::default()
            };
            let missing = source(&dir.path().join("none.yaml"));
            let config = load_run_config(&missing, overrides).unwrap();
            assert_eq!(config.base_url, BASE);
        }

        #[test]
        fn test_file_then_overrides() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("skenario.yaml");
            let yaml = "base_url: https://app.test/\ncommand_timeout_ms: 4000\n";
            std::fs::write(&path, yaml).unwrap();
            let overrides = ConfigOverrides {
                command_timeout_ms: Some(1_000),
                ..ConfigOverrides::default()
            };
            let config = load_run_config(&source(&path), overrides).unwrap();
            assert_eq!(config.command_timeout_ms, 1_000);
            assert_eq!(config.root(), dir.path());
        }

        #[test]
        fn test_invalid_override_rejected() {
            let dir = tempfile::tempdir().unwrap();
            let overrides = ConfigOverrides {
                base_url: Some("not-a-url".to_string()),
                ..ConfigOverrides::default()
            };
            assert!(load_run_config(&source(&dir.path().join("none.yaml")), overrides).is_err());
        }
    }

    mod execute_tests {
        use super::*;

        #[test]
        fn test_discover_reports_empty_pattern() {
            let dir = tempfile::tempdir().unwrap();
            let config = RunConfig::new(BASE).with_root(dir.path());
            let err = quiet_runner().discover(&config, None).unwrap_err();
            assert!(err.to_string().contains("no scenario files"));
        }

        #[test]
        fn test_execute_writes_reports() {
            let dir = tempfile::tempdir().unwrap();
            let config = RunConfig::new(BASE)
                .with_command_timeout(300)
                .with_poll_interval(20);
            let scenario = Scenario::new("Login").with_case(
                TestCase::new("sees heading")
                    .with_step(Step::navigate("${base_url}"))
                    .with_step(Step::assert_visible("APPLIKASI BIZ")),
            );
            let args = run_args(dir.path().join("out"));
            let report = quiet_runner()
                .execute(config, MockLauncher::new(MockSite::login_app(BASE)), &[scenario], &args)
                .unwrap();
            assert!(report.all_passed());
            assert!(dir.path().join("out/report.json").exists());
            assert!(dir.path().join("out/junit.xml").exists());
        }

        #[test]
        fn test_execute_fail_fast() {
            let dir = tempfile::tempdir().unwrap();
            let config = RunConfig::new(BASE)
                .with_command_timeout(100)
                .with_poll_interval(20);
            let scenario = Scenario::new("Login")
                .with_case(
                    TestCase::new("missing text")
                        .with_step(Step::navigate("${base_url}"))
                        .with_step(Step::assert_visible("nowhere")),
                )
                .with_case(TestCase::new("never runs").with_step(Step::navigate("${base_url}")));
            let mut args = run_args(dir.path().to_path_buf());
            args.fail_fast = true;
            args.format = ReportFormatArg::Json;
            let report = quiet_runner()
                .execute(config, MockLauncher::new(MockSite::login_app(BASE)), &[scenario], &args)
                .unwrap();
            assert_eq!(report.totals.failed, 1);
            assert_eq!(report.totals.skipped, 1);
            assert!(!dir.path().join("junit.xml").exists());
        }
    }
}
