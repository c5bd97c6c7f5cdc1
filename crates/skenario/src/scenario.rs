//! Scenario files.
//!
//! A scenario is a named list of test cases; a test case is an ordered list
//! of steps. Step parameters may reference run values as `${name}`; the
//! authored text is kept for reporting (so secrets never show up in
//! descriptions) and resolved against [`Variables`] right before execution.
//!
//! ```yaml
//! scenario: Skenario Login
//! cases:
//!   - name: Visits the login page and logs in
//!     steps:
//!       - type: navigate
//!         url: "${base_url}"
//!       - type: assert_visible
//!         text: APPLIKASI BIZ
//!       - type: fill_field
//!         selector: 'input[name="username"]'
//!         value: "${login_identifier}"
//! ```

use crate::locator::{Locator, Selector};
use crate::result::{ErrorKind, SkenarioError, SkenarioResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

const fn default_strict() -> bool {
    true
}

/// One browser action or assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    /// Load a URL (relative URLs join onto the base URL)
    Navigate {
        /// Target URL
        url: String,
    },
    /// Wait until a visible element contains the text
    AssertVisible {
        /// Text to look for
        text: String,
    },
    /// Replace the content of the element matching `selector`
    FillField {
        /// CSS selector
        selector: String,
        /// Value to set
        value: String,
        /// Require exactly one match
        #[serde(default = "default_strict")]
        strict: bool,
    },
    /// Click the element matching `selector`
    Click {
        /// CSS selector
        selector: String,
        /// Require exactly one match
        #[serde(default = "default_strict")]
        strict: bool,
    },
    /// Wait until the current URL contains the substring
    AssertUrlContains {
        /// Expected substring
        substring: String,
    },
}

impl Step {
    /// Navigate step
    #[must_use]
    pub fn navigate(url: impl Into<String>) -> Self {
        Self::Navigate { url: url.into() }
    }

    /// Visible-text assertion
    #[must_use]
    pub fn assert_visible(text: impl Into<String>) -> Self {
        Self::AssertVisible { text: text.into() }
    }

    /// Strict fill step
    #[must_use]
    pub fn fill_field(selector: impl Into<String>, value: impl Into<String>) -> Self {
        Self::FillField {
            selector: selector.into(),
            value: value.into(),
            strict: true,
        }
    }

    /// Strict click step
    #[must_use]
    pub fn click(selector: impl Into<String>) -> Self {
        Self::Click {
            selector: selector.into(),
            strict: true,
        }
    }

    /// URL assertion
    #[must_use]
    pub fn assert_url_contains(substring: impl Into<String>) -> Self {
        Self::AssertUrlContains {
            substring: substring.into(),
        }
    }

    /// Human-readable description, using the authored (unresolved) text
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Navigate { url } => format!("navigate to {url}"),
            Self::AssertVisible { text } => format!("expect {text:?} to be visible"),
            Self::FillField {
                selector, value, ..
            } => format!("fill {selector} with {value:?}"),
            Self::Click { selector, .. } => format!("click {selector}"),
            Self::AssertUrlContains { substring } => format!("expect URL to contain {substring:?}"),
        }
    }

    /// Locator for steps that act on an element
    #[must_use]
    pub fn locator(&self) -> Option<Locator> {
        match self {
            Self::FillField {
                selector, strict, ..
            }
            | Self::Click { selector, strict } => {
                Some(Locator::from_selector(Selector::css(selector.clone())).with_strict(*strict))
            }
            Self::AssertVisible { text } => {
                Some(Locator::from_selector(Selector::text(text.clone())))
            }
            _ => None,
        }
    }

    /// Substitute `${name}` references
    pub fn resolve(&self, vars: &Variables) -> SkenarioResult<Self> {
        Ok(match self {
            Self::Navigate { url } => Self::Navigate {
                url: vars.interpolate(url)?,
            },
            Self::AssertVisible { text } => Self::AssertVisible {
                text: vars.interpolate(text)?,
            },
            Self::FillField {
                selector,
                value,
                strict,
            } => Self::FillField {
                selector: vars.interpolate(selector)?,
                value: vars.interpolate(value)?,
                strict: *strict,
            },
            Self::Click { selector, strict } => Self::Click {
                selector: vars.interpolate(selector)?,
                strict: *strict,
            },
            Self::AssertUrlContains { substring } => Self::AssertUrlContains {
                substring: vars.interpolate(substring)?,
            },
        })
    }
}

/// A named, ordered sequence of steps with an expected outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestCase {
    /// Case name, unique within its scenario
    pub name: String,
    /// Steps in execution order
    pub steps: Vec<Step>,
    /// Polling timeout for this case (overrides the run's command timeout)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// The case is expected to fail with this kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect_failure: Option<ErrorKind>,
}

impl TestCase {
    /// Create a case
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            timeout_ms: None,
            expect_failure: None,
        }
    }

    /// Append a step
    #[must_use]
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Override the polling timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Expect this case to fail with `kind`
    #[must_use]
    pub const fn expecting_failure(mut self, kind: ErrorKind) -> Self {
        self.expect_failure = Some(kind);
        self
    }
}

/// A named collection of test cases loaded from one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Scenario name
    #[serde(rename = "scenario")]
    pub name: String,
    /// Test cases in file order
    pub cases: Vec<TestCase>,
    #[serde(skip)]
    source: PathBuf,
}

impl Scenario {
    /// Create an empty scenario
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: Vec::new(),
            source: PathBuf::new(),
        }
    }

    /// Append a case
    #[must_use]
    pub fn with_case(mut self, case: TestCase) -> Self {
        self.cases.push(case);
        self
    }

    /// Set the file this scenario came from
    #[must_use]
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = source.into();
        self
    }

    /// File this scenario came from
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Parse a scenario; `source` is used for error messages and reports
    pub fn from_yaml_str(yaml: &str, source: impl Into<PathBuf>) -> SkenarioResult<Self> {
        let source = source.into();
        let mut scenario: Self = serde_yaml_ng::from_str(yaml)
            .map_err(|e| SkenarioError::scenario(source.display().to_string(), e.to_string()))?;
        scenario.source = source;
        Ok(scenario)
    }

    /// Load a scenario file
    pub fn from_file(path: &Path) -> SkenarioResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            SkenarioError::scenario(path.display().to_string(), format!("cannot read: {e}"))
        })?;
        Self::from_yaml_str(&yaml, path)
    }

    /// Check structure and that every `${name}` resolves
    pub fn validate(&self, vars: &Variables) -> SkenarioResult<()> {
        let origin = self.source.display().to_string();
        let fail = |message: String| Err(SkenarioError::scenario(origin.clone(), message));

        if self.name.trim().is_empty() {
            return fail("scenario name must not be empty".to_string());
        }
        if self.cases.is_empty() {
            return fail(format!("scenario {:?} has no cases", self.name));
        }
        let mut seen = HashSet::new();
        for case in &self.cases {
            if !seen.insert(case.name.as_str()) {
                return fail(format!("duplicate case name {:?}", case.name));
            }
            if case.steps.is_empty() {
                return fail(format!("case {:?} has no steps", case.name));
            }
            if case.timeout_ms == Some(0) {
                return fail(format!("case {:?} has a zero timeout", case.name));
            }
            if matches!(case.expect_failure, Some(kind) if !kind.is_step_failure()) {
                return fail(format!(
                    "case {:?} can only expect a step failure kind",
                    case.name
                ));
            }
            for (index, step) in case.steps.iter().enumerate() {
                step.resolve(vars).map_err(|e| {
                    SkenarioError::scenario(
                        origin.clone(),
                        format!("case {:?} step {}: {e}", case.name, index + 1),
                    )
                })?;
            }
        }
        Ok(())
    }

    /// Keep only cases whose name contains `filter`
    #[must_use]
    pub fn filtered(mut self, filter: &str) -> Self {
        self.cases.retain(|c| c.name.contains(filter));
        self
    }
}

/// Named values available to steps as `${name}`
#[derive(Debug, Clone)]
pub struct Variables {
    values: BTreeMap<String, String>,
    pattern: Regex,
}

impl Variables {
    /// Build from a name → value table
    pub fn new(values: BTreeMap<String, String>) -> SkenarioResult<Self> {
        let pattern = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .map_err(|e| SkenarioError::config(e.to_string()))?;
        Ok(Self { values, pattern })
    }

    /// Look up a value
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Replace every `${name}` in `text`; unknown names are an error
    pub fn interpolate(&self, text: &str) -> SkenarioResult<String> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in self.pattern.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let value = self.get(name.as_str()).ok_or_else(|| {
                SkenarioError::config(format!("unknown variable ${{{}}}", name.as_str()))
            })?;
            out.push_str(&text[last..whole.start()]);
            out.push_str(value);
            last = whole.end();
        }
        out.push_str(&text[last..]);
        Ok(out)
    }
}
