//! Step execution against one browser session.
//!
//! ```text
//!  NotStarted ──start──► Running ──pass──► Passed
//!                           │
//!                           └──fail──► Failed
//! ```
//!
//! Steps run strictly in order. The first failing step fails the case and
//! every later step is reported as skipped. Waiting happens only inside the
//! polling steps, bounded by the case's timeout.

use crate::config::RunConfig;
use crate::driver::{BrowserDriver, ElementHandle};
use crate::locator::{Locator, Resolution, Selector};
use crate::report::{CaseReport, FailureDetail, StepReport, TestStatus};
use crate::result::{SkenarioError, SkenarioResult};
use crate::scenario::{Scenario, Step, TestCase, Variables};
use crate::wait::{PollOutcome, Poller, WaitOptions};
use tokio::time::Instant;

/// Lifecycle of one case run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// Created, no step executed yet
    #[default]
    NotStarted,
    /// Executing steps
    Running,
    /// Every step passed
    Passed,
    /// A step failed
    Failed,
}

impl RunState {
    /// Whether the run has finished
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Passed | Self::Failed)
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow
    pub fn transition(&mut self, next: Self) -> SkenarioResult<()> {
        let allowed = matches!(
            (*self, next),
            (Self::NotStarted, Self::Running) | (Self::Running, Self::Passed | Self::Failed)
        );
        if !allowed {
            return Err(SkenarioError::InvalidState {
                message: format!("cannot go from {self:?} to {next:?}"),
            });
        }
        *self = next;
        Ok(())
    }
}

/// Runs test cases step by step
#[derive(Debug)]
pub struct ScenarioExecutor<'a> {
    config: &'a RunConfig,
    vars: &'a Variables,
}

impl<'a> ScenarioExecutor<'a> {
    /// Create an executor for one run
    #[must_use]
    pub const fn new(config: &'a RunConfig, vars: &'a Variables) -> Self {
        Self { config, vars }
    }

    /// Polling options for `case`
    #[must_use]
    pub fn wait_options(&self, case: &TestCase) -> WaitOptions {
        let options = self.config.wait_options();
        match case.timeout_ms {
            Some(timeout) => options
                .with_timeout(timeout)
                .with_poll_interval(options.poll_interval_ms.min(timeout)),
            None => options,
        }
    }

    /// Run every step of `case` in `driver` and build its report
    #[tracing::instrument(skip_all, fields(case = %case.name))]
    pub async fn run_case<D: BrowserDriver>(
        &self,
        driver: &mut D,
        scenario: &Scenario,
        case: &TestCase,
    ) -> SkenarioResult<CaseReport> {
        let wait = self.wait_options(case);
        let started = Instant::now();
        let mut state = RunState::NotStarted;
        let mut steps = Vec::with_capacity(case.steps.len());
        let mut failure = None;

        state.transition(RunState::Running)?;
        for (i, step) in case.steps.iter().enumerate() {
            let index = i + 1;
            if state == RunState::Failed {
                steps.push(StepReport {
                    index,
                    description: step.describe(),
                    status: TestStatus::Skipped,
                    duration_ms: 0,
                });
                continue;
            }

            let step_started = Instant::now();
            let outcome = self.execute_step(driver, step, &wait).await;
            let duration_ms = step_started.elapsed().as_millis() as u64;
            match outcome {
                Ok(()) => {
                    tracing::debug!(step = index, description = %step.describe(), "step passed");
                    steps.push(StepReport {
                        index,
                        description: step.describe(),
                        status: TestStatus::Passed,
                        duration_ms,
                    });
                }
                Err(err) => {
                    tracing::info!(step = index, error = %err, "step failed");
                    steps.push(StepReport {
                        index,
                        description: step.describe(),
                        status: TestStatus::Failed,
                        duration_ms,
                    });
                    failure = Some(failure_detail(scenario, case, index, step, &err));
                    state.transition(RunState::Failed)?;
                }
            }
        }
        if !state.is_terminal() {
            state.transition(RunState::Passed)?;
        }

        let (status, failure) = judge(scenario, case, state, failure);
        Ok(CaseReport {
            name: case.name.clone(),
            status,
            expected_failure: case.expect_failure,
            duration_ms: started.elapsed().as_millis() as u64,
            steps,
            failure,
        })
    }

    /// Execute one step; step failures come back as their typed error
    pub async fn execute_step<D: BrowserDriver>(
        &self,
        driver: &mut D,
        step: &Step,
        wait: &WaitOptions,
    ) -> SkenarioResult<()> {
        let step = step.resolve(self.vars)?;
        match &step {
            Step::Navigate { url } => navigate(driver, &self.config.resolve_url(url), wait).await,
            Step::AssertVisible { text } => assert_visible(driver, text, wait).await,
            Step::FillField { value, .. } => {
                let (locator, element) = target(driver, &step, wait).await?;
                driver.fill(locator.selector(), &element, value).await
            }
            Step::Click { .. } => {
                let (locator, element) = target(driver, &step, wait).await?;
                driver.click(locator.selector(), &element).await
            }
            Step::AssertUrlContains { substring } => {
                assert_url_contains(driver, substring, wait).await
            }
        }
    }
}

async fn navigate<D: BrowserDriver>(
    driver: &mut D,
    url: &str,
    wait: &WaitOptions,
) -> SkenarioResult<()> {
    match tokio::time::timeout(wait.timeout(), driver.navigate(url)).await {
        Ok(result) => result,
        Err(_) => Err(SkenarioError::NavigationError {
            url: url.to_string(),
            message: format!("page did not load within {}ms", wait.timeout_ms),
        }),
    }
}

/// Make one attempt; a transient page error becomes the observation
async fn observe<T, F>(attempt: F) -> SkenarioResult<Result<T, String>>
where
    F: std::future::Future<Output = SkenarioResult<T>>,
{
    match attempt.await {
        Ok(value) => Ok(Ok(value)),
        Err(err) if err.is_transient() => {
            tracing::debug!(error = %err, "attempt failed, retrying");
            Ok(Err(err.to_string()))
        }
        Err(err) => Err(err),
    }
}

async fn assert_visible<D: BrowserDriver>(
    driver: &D,
    text: &str,
    wait: &WaitOptions,
) -> SkenarioResult<()> {
    let selector = Selector::text(text);
    let mut poller = Poller::start(wait);
    let outcome = loop {
        let observed = match observe(driver.query(&selector)).await? {
            Ok(matches) => {
                if let Some(element) = matches.iter().find(|e| e.visible) {
                    break poller.ready(element.clone());
                }
                if matches.is_empty() {
                    "no element containing the text".to_string()
                } else {
                    format!("{} matching element(s), none visible", matches.len())
                }
            }
            Err(error) => error,
        };
        if !poller.next_attempt().await {
            break poller.timed_out(observed);
        }
    };
    match outcome {
        PollOutcome::Ready { attempts, .. } => {
            tracing::trace!(attempts, "text visible");
            Ok(())
        }
        PollOutcome::TimedOut { last_observed, .. } => Err(SkenarioError::AssertionTimeout {
            expected: format!("text {text:?} to be visible"),
            observed: last_observed,
            timeout_ms: wait.timeout_ms,
        }),
    }
}

async fn assert_url_contains<D: BrowserDriver>(
    driver: &D,
    substring: &str,
    wait: &WaitOptions,
) -> SkenarioResult<()> {
    let mut poller = Poller::start(wait);
    let outcome = loop {
        let observed = match observe(driver.current_url()).await? {
            Ok(url) if url.contains(substring) => break poller.ready(url),
            Ok(url) | Err(url) => url,
        };
        if !poller.next_attempt().await {
            break poller.timed_out(observed);
        }
    };
    match outcome {
        PollOutcome::Ready { .. } => Ok(()),
        PollOutcome::TimedOut { last_observed, .. } => Err(SkenarioError::AssertionTimeout {
            expected: format!("URL to contain {substring:?}"),
            observed: last_observed,
            timeout_ms: wait.timeout_ms,
        }),
    }
}

/// Resolve the element a fill or click step acts on
async fn target<D: BrowserDriver>(
    driver: &D,
    step: &Step,
    wait: &WaitOptions,
) -> SkenarioResult<(Locator, ElementHandle)> {
    let locator = step.locator().ok_or_else(|| SkenarioError::InvalidState {
        message: format!("{} has no target element", step.describe()),
    })?;
    let element = resolve_element(driver, &locator, wait).await?;
    Ok((locator, element))
}

/// Wait for `locator` to match one visible element; ambiguity fails without waiting
async fn resolve_element<D: BrowserDriver>(
    driver: &D,
    locator: &Locator,
    wait: &WaitOptions,
) -> SkenarioResult<ElementHandle> {
    let mut poller = Poller::start(wait);
    loop {
        let observed = match observe(driver.query(locator.selector())).await? {
            Ok(matches) => match locator.resolve(matches) {
                Resolution::Found(element) if element.visible => return Ok(element),
                Resolution::Found(element) => {
                    format!("<{}> matched but is not visible", element.tag_name)
                }
                Resolution::Ambiguous(count) => {
                    return Err(SkenarioError::AmbiguousSelector {
                        selector: locator.selector().to_string(),
                        count,
                    })
                }
                Resolution::Missing => "no match".to_string(),
            },
            Err(error) => error,
        };
        if !poller.next_attempt().await {
            return Err(SkenarioError::ElementNotFound {
                selector: locator.selector().to_string(),
                observed,
                timeout_ms: wait.timeout_ms,
            });
        }
    }
}

fn failure_detail(
    scenario: &Scenario,
    case: &TestCase,
    index: usize,
    step: &Step,
    err: &SkenarioError,
) -> FailureDetail {
    let (expected, observed) = match err {
        SkenarioError::AssertionTimeout {
            expected, observed, ..
        } => (expected.clone(), observed.clone()),
        SkenarioError::ElementNotFound {
            selector,
            observed,
            timeout_ms,
        } => (
            format!("a visible element matching {selector}"),
            format!("{observed} after {timeout_ms}ms"),
        ),
        SkenarioError::AmbiguousSelector { selector, count } => (
            format!("exactly one element matching {selector}"),
            format!("{count} matches"),
        ),
        SkenarioError::NavigationError { url, message } => {
            (format!("{url} to load"), message.clone())
        }
        other => (step.describe(), other.to_string()),
    };
    FailureDetail {
        file: scenario.source().display().to_string(),
        case: case.name.clone(),
        step_index: Some(index),
        step: Some(step.describe()),
        expected,
        observed,
        kind: Some(err.kind()),
    }
}

/// Apply the case's expected failure to the raw outcome
fn judge(
    scenario: &Scenario,
    case: &TestCase,
    state: RunState,
    failure: Option<FailureDetail>,
) -> (TestStatus, Option<FailureDetail>) {
    match (case.expect_failure, state, failure) {
        (None, RunState::Passed, _) => (TestStatus::Passed, None),
        (None, _, failure) => (TestStatus::Failed, failure),
        (Some(expected), RunState::Failed, Some(failure)) if failure.kind == Some(expected) => {
            (TestStatus::Passed, Some(failure))
        }
        (Some(expected), RunState::Failed, Some(failure)) => {
            let actual = failure.kind.map_or("unknown", |k| k.as_str());
            (
                TestStatus::Failed,
                Some(FailureDetail {
                    expected: format!("failure of kind {expected}"),
                    observed: format!("{actual}: {}", failure.observed),
                    ..failure
                }),
            )
        }
        (Some(expected), _, _) => (
            TestStatus::Failed,
            Some(FailureDetail {
                file: scenario.source().display().to_string(),
                case: case.name.clone(),
                step_index: None,
                step: None,
                expected: format!("failure of kind {expected}"),
                observed: "every step passed".to_string(),
                kind: None,
            }),
        ),
    }
}
