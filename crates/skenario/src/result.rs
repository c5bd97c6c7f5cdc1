//! Result and error types for Skenario.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for Skenario operations
pub type SkenarioResult<T> = Result<T, SkenarioError>;

/// Stable classification of an error, used in reports and negative-path
/// expectations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Target page unreachable or not loaded in time
    NavigationError,
    /// Selector matched nothing before the deadline
    ElementNotFound,
    /// Strict selector matched more than one element
    AmbiguousSelector,
    /// Polled condition never became true
    AssertionTimeout,
    /// Browser could not be launched or driven
    Browser,
    /// Configuration was invalid
    Config,
    /// Scenario file was invalid
    Scenario,
    /// I/O, serialization or other infrastructure failure
    Internal,
}

impl ErrorKind {
    /// Whether this kind is one of the four step failures
    #[must_use]
    pub const fn is_step_failure(self) -> bool {
        matches!(
            self,
            Self::NavigationError
                | Self::ElementNotFound
                | Self::AmbiguousSelector
                | Self::AssertionTimeout
        )
    }

    /// Name as written in scenario files and reports
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NavigationError => "navigation_error",
            Self::ElementNotFound => "element_not_found",
            Self::AmbiguousSelector => "ambiguous_selector",
            Self::AssertionTimeout => "assertion_timeout",
            Self::Browser => "browser",
            Self::Config => "config",
            Self::Scenario => "scenario",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur in Skenario
#[derive(Debug, Error)]
pub enum SkenarioError {
    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// No element matched the selector before the deadline
    #[error("Element not found: {selector} (waited {timeout_ms}ms, last saw {observed})")]
    ElementNotFound {
        /// Selector that was resolved
        selector: String,
        /// Last observed state, e.g. a hidden match
        observed: String,
        /// How long resolution waited
        timeout_ms: u64,
    },

    /// Strict selector matched several elements
    #[error("Ambiguous selector: {selector} matched {count} elements, expected exactly one")]
    AmbiguousSelector {
        /// Selector that was resolved
        selector: String,
        /// Number of matches observed
        count: usize,
    },

    /// Polled assertion did not hold before the deadline
    #[error("Timed out after {timeout_ms}ms: expected {expected}, observed {observed}")]
    AssertionTimeout {
        /// Expected condition
        expected: String,
        /// Last observed state
        observed: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Page error
    #[error("Page error: {message}")]
    PageError {
        /// Error message
        message: String,
    },

    /// Invalid state transition
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Scenario file error
    #[error("Scenario error in {source_name}: {message}")]
    Scenario {
        /// File or scenario the error belongs to
        source_name: String,
        /// Error message
        message: String,
    },

    /// Discovery pattern error
    #[error("Invalid spec pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl SkenarioError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a scenario error
    #[must_use]
    pub fn scenario(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Scenario {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create a page error
    #[must_use]
    pub fn page(message: impl Into<String>) -> Self {
        Self::PageError {
            message: message.into(),
        }
    }

    /// A page-level failure a later attempt may not see, such as a lost
    /// execution context while the document is being replaced
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::PageError { .. })
    }

    /// Classify this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NavigationError { .. } => ErrorKind::NavigationError,
            Self::ElementNotFound { .. } => ErrorKind::ElementNotFound,
            Self::AmbiguousSelector { .. } => ErrorKind::AmbiguousSelector,
            Self::AssertionTimeout { .. } => ErrorKind::AssertionTimeout,
            Self::BrowserLaunchError { .. } | Self::PageError { .. } => ErrorKind::Browser,
            Self::Config { .. } => ErrorKind::Config,
            Self::Scenario { .. } | Self::Pattern(_) | Self::Yaml(_) => ErrorKind::Scenario,
            Self::InvalidState { .. } | Self::Io(_) | Self::Json(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_step_failure_kinds() {
        assert!(ErrorKind::NavigationError.is_step_failure());
        assert!(ErrorKind::ElementNotFound.is_step_failure());
        assert!(ErrorKind::AmbiguousSelector.is_step_failure());
        assert!(ErrorKind::AssertionTimeout.is_step_failure());
        assert!(!ErrorKind::Browser.is_step_failure());
        assert!(!ErrorKind::Config.is_step_failure());
    }

    #[test]
    fn test_only_page_errors_are_transient() {
        assert!(SkenarioError::page("Cannot find context with specified id").is_transient());
        assert!(!SkenarioError::config("bad").is_transient());
        let launch = SkenarioError::BrowserLaunchError {
            message: "no chromium".to_string(),
        };
        assert!(!launch.is_transient());
    }

    #[test]
    fn test_kind_mapping() {
        let err = SkenarioError::AmbiguousSelector {
            selector: "input".to_string(),
            count: 2,
        };
        assert_eq!(err.kind(), ErrorKind::AmbiguousSelector);
        assert!(err.to_string().contains("matched 2 elements"));

        let err = SkenarioError::config("bad");
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_assertion_timeout_message_names_expected_and_observed() {
        let err = SkenarioError::AssertionTimeout {
            expected: "URL to contain \"/home\"".to_string(),
            observed: "https://app.test/login".to_string(),
            timeout_ms: 10_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("/home"));
        assert!(msg.contains("https://app.test/login"));
        assert!(msg.contains("10000ms"));
    }

    #[test]
    fn test_error_kind_serde_names() {
        let json = serde_json::to_string(&ErrorKind::AssertionTimeout).unwrap();
        assert_eq!(json, "\"assertion_timeout\"");
        let kind: ErrorKind = serde_yaml_ng::from_str("element_not_found").unwrap();
        assert_eq!(kind, ErrorKind::ElementNotFound);
        assert_eq!(ErrorKind::ElementNotFound.to_string(), "element_not_found");
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SkenarioError = io_err.into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.to_string().contains("I/O"));
    }
}
