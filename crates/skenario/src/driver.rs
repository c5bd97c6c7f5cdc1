//! Browser driver boundary.
//!
//! The executor never talks to a browser directly. It drives a
//! [`BrowserDriver`], obtained per test case from a [`SessionLauncher`], so
//! the CDP implementation (`browser` feature) and the in-memory
//! [`MockDriver`](crate::MockDriver) are interchangeable.
//!
//! ```text
//! ┌──────────────────┐   launch()   ┌───────────────────┐
//! │ ScenarioExecutor │ ───────────► │ SessionLauncher   │
//! │                  │              └───────────────────┘
//! │  navigate/query  │                       │
//! │  fill/click      │              ┌────────▼──────────┐
//! │  current_url     │ ───────────► │ BrowserDriver     │
//! └──────────────────┘              │  ChromiumDriver   │
//!                                   │  MockDriver       │
//!                                   └───────────────────┘
//! ```

use crate::locator::Selector;
use crate::result::SkenarioResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Element handle returned by a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Position among the selector's matches, in document order
    pub index: usize,
    /// Element tag name (lowercase)
    pub tag_name: String,
    /// Text content, trimmed
    #[serde(default)]
    pub text: String,
    /// Whether the element is rendered and visible
    #[serde(default)]
    pub visible: bool,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(index: usize, tag_name: impl Into<String>) -> Self {
        Self {
            index,
            tag_name: tag_name.into(),
            text: String::new(),
            visible: false,
        }
    }

    /// Set text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set visibility
    #[must_use]
    pub const fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}

/// One live browser session.
///
/// Implementations perform a single attempt per call; waiting and retrying
/// is the executor's job.
#[async_trait]
pub trait BrowserDriver: Send {
    /// Load `url` and wait for the page to finish loading
    async fn navigate(&mut self, url: &str) -> SkenarioResult<()>;

    /// Current location
    async fn current_url(&self) -> SkenarioResult<String>;

    /// All elements currently matching `selector`, in document order
    async fn query(&self, selector: &Selector) -> SkenarioResult<Vec<ElementHandle>>;

    /// Replace the content of a previously queried element
    async fn fill(
        &mut self,
        selector: &Selector,
        element: &ElementHandle,
        value: &str,
    ) -> SkenarioResult<()>;

    /// Dispatch a synthetic click on a previously queried element
    async fn click(&mut self, selector: &Selector, element: &ElementHandle) -> SkenarioResult<()>;

    /// End the session
    async fn close(&mut self) -> SkenarioResult<()>;
}

/// Opens a fresh, isolated session for each test case.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    /// Driver type produced
    type Driver: BrowserDriver;

    /// Open a new session
    async fn launch(&self) -> SkenarioResult<Self::Driver>;
}
