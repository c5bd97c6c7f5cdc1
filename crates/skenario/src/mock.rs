//! In-memory driver for testing scenarios without a browser.
//!
//! A [`MockSite`] is a set of pages keyed by URL plus click rules. Elements
//! can appear after a delay and click rules can navigate after a delay, so
//! polling behavior is testable with tokio's paused clock. Rules may require
//! field values (a login form that only redirects on the right credentials).

use crate::driver::{BrowserDriver, ElementHandle, SessionLauncher};
use crate::locator::Selector;
use crate::result::{SkenarioError, SkenarioResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// An element on a mock page
#[derive(Debug, Clone)]
pub struct MockElement {
    /// CSS selector this element answers to (exact match)
    pub css: String,
    /// Tag name
    pub tag_name: String,
    /// Text content
    pub text: String,
    /// Whether the element is visible once rendered
    pub visible: bool,
    /// Delay after page load before the element is rendered
    pub appears_after: Duration,
}

impl MockElement {
    /// Create a visible element
    #[must_use]
    pub fn new(css: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            css: css.into(),
            tag_name: tag_name.into(),
            text: String::new(),
            visible: true,
            appears_after: Duration::ZERO,
        }
    }

    /// Set text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Mark as hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Render only after `delay` has passed since the page loaded
    #[must_use]
    pub const fn appearing_after(mut self, delay: Duration) -> Self {
        self.appears_after = delay;
        self
    }

    fn matches(&self, selector: &Selector) -> bool {
        match selector {
            Selector::Css(css) => &self.css == css,
            Selector::Text(text) => self.text.contains(text.as_str()),
        }
    }
}

/// A mock page
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    /// Elements in document order
    pub elements: Vec<MockElement>,
    /// Time `navigate` takes to load this page
    pub load_delay: Duration,
}

impl MockPage {
    /// Create an empty page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element
    #[must_use]
    pub fn with_element(mut self, element: MockElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Set load delay
    #[must_use]
    pub const fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }
}

/// Navigation triggered by clicking an element
#[derive(Debug, Clone)]
pub struct MockRoute {
    /// Page the click happens on
    pub on_page: String,
    /// CSS of the clicked element
    pub css: String,
    /// Field values that must be present, by CSS
    pub requires: Vec<(String, String)>,
    /// Destination when requirements hold
    pub target: String,
    /// Destination when they do not (None = stay)
    pub otherwise: Option<String>,
    /// Delay before the navigation lands
    pub delay: Duration,
}

impl MockRoute {
    /// Clicking `css` on `on_page` navigates to `target`
    #[must_use]
    pub fn new(
        on_page: impl Into<String>,
        css: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            on_page: on_page.into(),
            css: css.into(),
            requires: Vec::new(),
            target: target.into(),
            otherwise: None,
            delay: Duration::ZERO,
        }
    }

    /// Require a field value for the navigation to happen
    #[must_use]
    pub fn requiring(mut self, css: impl Into<String>, value: impl Into<String>) -> Self {
        self.requires.push((css.into(), value.into()));
        self
    }

    /// Where to go when requirements fail
    #[must_use]
    pub fn otherwise(mut self, url: impl Into<String>) -> Self {
        self.otherwise = Some(url.into());
        self
    }

    /// Land the navigation after `delay`
    #[must_use]
    pub const fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Pages and click rules shared by every session of a [`MockLauncher`]
#[derive(Debug, Clone, Default)]
pub struct MockSite {
    pages: HashMap<String, MockPage>,
    routes: Vec<MockRoute>,
}

impl MockSite {
    /// Create an empty site
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `page` at `url`
    #[must_use]
    pub fn with_page(mut self, url: impl Into<String>, page: MockPage) -> Self {
        self.pages.insert(url.into(), page);
        self
    }

    /// Add a click rule
    #[must_use]
    pub fn with_route(mut self, route: MockRoute) -> Self {
        self.routes.push(route);
        self
    }

    /// The login application the shipped scenario targets, served at `base_url`.
    ///
    /// Only `admin` / `1234` reaches `{base_url}home`; anything else stays on
    /// the login page.
    #[must_use]
    pub fn login_app(base_url: &str) -> Self {
        let base = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let home = format!("{base}home");
        let login = MockPage::new()
            .with_element(MockElement::new("h1", "h1").with_text("APPLIKASI BIZ"))
            .with_element(MockElement::new(r#"input[name="username"]"#, "input"))
            .with_element(MockElement::new(r#"input[name="password"]"#, "input"))
            .with_element(MockElement::new(r#"input[name="submit"]"#, "input"));
        let dashboard = MockPage::new()
            .with_element(MockElement::new("h2", "h2").with_text("DASHBOARD"));
        Self::new()
            .with_page(base.clone(), login)
            .with_page(home.clone(), dashboard)
            .with_route(
                MockRoute::new(base, r#"input[name="submit"]"#, home)
                    .requiring(r#"input[name="username"]"#, "admin")
                    .requiring(r#"input[name="password"]"#, "1234")
                    .after(Duration::from_millis(200)),
            )
    }
}

/// In-memory browser session
#[derive(Debug)]
pub struct MockDriver {
    site: MockSite,
    url: String,
    loaded_at: Instant,
    pending: Option<(Instant, String)>,
    values: HashMap<String, String>,
    /// Call history for verification
    pub call_history: Vec<String>,
}

impl MockDriver {
    /// Create a session on `about:blank`
    #[must_use]
    pub fn new(site: MockSite) -> Self {
        Self {
            site,
            url: "about:blank".to_string(),
            loaded_at: Instant::now(),
            pending: None,
            values: HashMap::new(),
            call_history: Vec::new(),
        }
    }

    /// Current value of a field, by CSS
    #[must_use]
    pub fn field_value(&self, css: &str) -> Option<&str> {
        self.values.get(css).map(String::as_str)
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.call_history.iter().any(|c| c.starts_with(method))
    }

    fn landed(&self) -> Option<&str> {
        match &self.pending {
            Some((at, target)) if Instant::now() >= *at => Some(target.as_str()),
            _ => None,
        }
    }

    fn effective_url(&self) -> &str {
        self.landed().unwrap_or(&self.url)
    }

    fn effective_loaded_at(&self) -> Instant {
        match &self.pending {
            Some((at, _)) if Instant::now() >= *at => *at,
            _ => self.loaded_at,
        }
    }

    /// Apply a navigation whose delay has elapsed
    fn settle(&mut self) {
        if let Some(target) = self.landed().map(str::to_string) {
            if let Some((at, _)) = self.pending.take() {
                self.loaded_at = at;
            }
            self.url = target;
            self.values.clear();
        }
    }

    fn rendered(&self, selector: &Selector) -> Vec<(usize, &MockElement)> {
        let Some(page) = self.site.pages.get(self.effective_url()) else {
            return Vec::new();
        };
        let now = Instant::now();
        let loaded_at = self.effective_loaded_at();
        page.elements
            .iter()
            .filter(|e| now >= loaded_at + e.appears_after && e.matches(selector))
            .enumerate()
            .collect()
    }

    fn element_at(
        &self,
        selector: &Selector,
        element: &ElementHandle,
    ) -> SkenarioResult<MockElement> {
        self.rendered(selector)
            .into_iter()
            .find(|(i, _)| *i == element.index)
            .map(|(_, e)| e.clone())
            .ok_or_else(|| {
                SkenarioError::page(format!("element {selector} #{} detached", element.index))
            })
    }
}

#[async_trait]
impl BrowserDriver for MockDriver {
    async fn navigate(&mut self, url: &str) -> SkenarioResult<()> {
        self.call_history.push(format!("navigate:{url}"));
        let page = self
            .site
            .pages
            .get(url)
            .ok_or_else(|| SkenarioError::NavigationError {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            })?;
        let delay = page.load_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.url = url.to_string();
        self.loaded_at = Instant::now();
        self.pending = None;
        self.values.clear();
        Ok(())
    }

    async fn current_url(&self) -> SkenarioResult<String> {
        Ok(self.effective_url().to_string())
    }

    async fn query(&self, selector: &Selector) -> SkenarioResult<Vec<ElementHandle>> {
        Ok(self
            .rendered(selector)
            .into_iter()
            .map(|(index, e)| {
                ElementHandle::new(index, e.tag_name.clone())
                    .with_text(e.text.clone())
                    .with_visible(e.visible)
            })
            .collect())
    }

    async fn fill(
        &mut self,
        selector: &Selector,
        element: &ElementHandle,
        value: &str,
    ) -> SkenarioResult<()> {
        self.settle();
        self.call_history.push(format!("fill:{selector}={value}"));
        let target = self.element_at(selector, element)?;
        self.values.insert(target.css, value.to_string());
        Ok(())
    }

    async fn click(&mut self, selector: &Selector, element: &ElementHandle) -> SkenarioResult<()> {
        self.settle();
        self.call_history.push(format!("click:{selector}"));
        let target = self.element_at(selector, element)?;
        let route = self
            .site
            .routes
            .iter()
            .find(|r| r.on_page == self.url && r.css == target.css)
            .cloned();
        if let Some(route) = route {
            let satisfied = route
                .requires
                .iter()
                .all(|(css, value)| self.values.get(css) == Some(value));
            let destination = if satisfied {
                Some(route.target)
            } else {
                route.otherwise
            };
            if let Some(destination) = destination {
                self.pending = Some((Instant::now() + route.delay, destination));
            }
        }
        Ok(())
    }

    async fn close(&mut self) -> SkenarioResult<()> {
        self.call_history.push("close".to_string());
        Ok(())
    }
}

/// Launches [`MockDriver`] sessions over a shared site
#[derive(Debug, Clone)]
pub struct MockLauncher {
    site: MockSite,
    launches: Arc<AtomicUsize>,
}

impl MockLauncher {
    /// Create a launcher
    #[must_use]
    pub fn new(site: MockSite) -> Self {
        Self {
            site,
            launches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of sessions opened so far
    #[must_use]
    pub fn launch_count(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionLauncher for MockLauncher {
    type Driver = MockDriver;

    async fn launch(&self) -> SkenarioResult<MockDriver> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        Ok(MockDriver::new(self.site.clone()))
    }
}
