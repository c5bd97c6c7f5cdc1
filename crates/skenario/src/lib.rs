//! Skenario: scripted browser scenarios for web applications.
//!
//! A run loads a [`RunConfig`], discovers scenario files, and executes each
//! test case in a fresh browser session: navigate, assert visible text, fill
//! fields, click, assert the URL. Every wait is a bounded poll; the first
//! failing step fails its case and the run reports per-case results.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    SKENARIO Architecture                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ skenario   │    │ Scenario   │    │ Scenario   │            │
//! │   │ .yaml      │───►│ discovery  │───►│ Runner     │            │
//! │   │ (config)   │    │ (glob)     │    │            │            │
//! │   └────────────┘    └────────────┘    └─────┬──────┘            │
//! │                                             │ per case          │
//! │   ┌────────────┐    ┌────────────┐    ┌─────▼──────┐            │
//! │   │ RunReport  │◄───│ Executor   │◄───│ Session    │            │
//! │   │ JSON/JUnit │    │ (polling)  │    │ Launcher   │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use skenario::prelude::*;
//!
//! # async fn demo() -> SkenarioResult<()> {
//! let config = RunConfig::from_file(std::path::Path::new("skenario.yaml"))?;
//! let scenarios = load_scenarios(&config, None)?;
//! let launcher = MockLauncher::new(MockSite::login_app(&config.base_url));
//! let report = ScenarioRunner::new(config, launcher).run(&scenarios).await?;
//! assert!(report.all_passed());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod browser;
mod config;
mod discovery;
mod driver;
mod executor;
mod locator;
mod mock;
mod report;
mod result;
mod runner;
mod scenario;

/// Bounded polling primitive
pub mod wait;

pub use browser::{BrowserConfig, CLOSE_TIMEOUT};
#[cfg(feature = "browser")]
pub use browser::{ChromiumDriver, ChromiumLauncher};
pub use config::{
    ConfigOverrides, Credentials, RunConfig, DEFAULT_COMMAND_TIMEOUT_MS, DEFAULT_CONFIG_FILE,
    DEFAULT_SPEC_PATTERN,
};
pub use discovery::{discover_files, expand_braces, load_scenarios};
pub use driver::{BrowserDriver, ElementHandle, SessionLauncher};
pub use executor::{RunState, ScenarioExecutor};
pub use locator::{Locator, Resolution, Selector};
pub use mock::{MockDriver, MockElement, MockLauncher, MockPage, MockRoute, MockSite};
pub use report::{
    CaseReport, FailureDetail, FailureMode, ReportFormat, RunReport, ScenarioReport, StepReport,
    TestStatus, Totals,
};
pub use result::{ErrorKind, SkenarioError, SkenarioResult};
pub use runner::{RunObserver, ScenarioRunner, SilentObserver};
pub use scenario::{Scenario, Step, TestCase, Variables};
pub use wait::{PollOutcome, Poller, WaitOptions, DEFAULT_POLL_INTERVAL_MS};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::browser::*;
    pub use super::config::*;
    pub use super::discovery::*;
    pub use super::driver::*;
    pub use super::executor::*;
    pub use super::locator::*;
    pub use super::mock::*;
    pub use super::report::*;
    pub use super::result::*;
    pub use super::runner::*;
    pub use super::scenario::*;
    pub use super::wait::*;
}
