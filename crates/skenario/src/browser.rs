//! Browser control over the Chrome `DevTools` Protocol.
//!
//! With the `browser` feature this module provides [`ChromiumLauncher`],
//! which starts a fresh Chromium process with its own profile directory for
//! every session, and [`ChromiumDriver`], which implements
//! [`BrowserDriver`](crate::BrowserDriver) by evaluating the locator scripts
//! in the page. Without the feature only [`BrowserConfig`] is available.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// How long closing a session waits for the browser process to exit
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Wait for a browser process to exit, giving up after `limit`.
///
/// Returns `true` when the process exited cleanly.
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
pub(crate) async fn await_exit<F, T, E>(exit: F, limit: Duration) -> bool
where
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    match tokio::time::timeout(limit, exit).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "waiting for the browser to exit failed");
            false
        }
        Err(_) => {
            tracing::warn!(limit_ms = limit.as_millis() as u64, "browser did not exit in time");
            false
        }
    }
}

/// Browser launch settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 800,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

// ============================================================================
// CDP implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
mod cdp {
    use super::{await_exit, BrowserConfig, CLOSE_TIMEOUT};
    use crate::driver::{BrowserDriver, ElementHandle, SessionLauncher};
    use crate::locator::Selector;
    use crate::result::{SkenarioError, SkenarioResult};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser, BrowserConfig as CdpConfig};
    use chromiumoxide::page::Page;
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use std::path::{Path, PathBuf};
    use tokio::task::JoinHandle;

    /// Starts one Chromium process per session
    #[derive(Debug, Clone)]
    pub struct ChromiumLauncher {
        config: BrowserConfig,
    }

    impl ChromiumLauncher {
        /// Create a launcher
        #[must_use]
        pub const fn new(config: BrowserConfig) -> Self {
            Self { config }
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        fn cdp_config(&self, profile: &Path) -> SkenarioResult<CdpConfig> {
            let mut builder = CdpConfig::builder()
                .window_size(self.config.viewport_width, self.config.viewport_height)
                .user_data_dir(profile);
            if !self.config.headless {
                builder = builder.with_head();
            }
            if !self.config.sandbox {
                builder = builder.no_sandbox();
            }
            if let Some(ref path) = self.config.chromium_path {
                builder = builder.chrome_executable(path);
            }
            builder
                .build()
                .map_err(|message| SkenarioError::BrowserLaunchError { message })
        }
    }

    #[async_trait]
    impl SessionLauncher for ChromiumLauncher {
        type Driver = ChromiumDriver;

        async fn launch(&self) -> SkenarioResult<ChromiumDriver> {
            let profile =
                std::env::temp_dir().join(format!("skenario-profile-{}", uuid::Uuid::new_v4()));
            let cdp_config = self.cdp_config(&profile)?;

            let (browser, mut handler) =
                Browser::launch(cdp_config)
                    .await
                    .map_err(|e| SkenarioError::BrowserLaunchError {
                        message: e.to_string(),
                    })?;

            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| SkenarioError::page(e.to_string()))?;

            tracing::debug!(profile = %profile.display(), "browser session started");
            Ok(ChromiumDriver {
                browser,
                page,
                handle,
                profile,
            })
        }
    }

    /// A live Chromium session with a single page
    #[derive(Debug)]
    pub struct ChromiumDriver {
        browser: Browser,
        page: Page,
        handle: JoinHandle<()>,
        profile: PathBuf,
    }

    impl ChromiumDriver {
        async fn eval<T: DeserializeOwned>(&self, script: String) -> SkenarioResult<T> {
            let result = self
                .page
                .evaluate(script)
                .await
                .map_err(|e| SkenarioError::page(e.to_string()))?;
            result
                .into_value()
                .map_err(|e| SkenarioError::page(e.to_string()))
        }

        async fn act(
            &self,
            selector: &Selector,
            element: &ElementHandle,
            script: String,
        ) -> SkenarioResult<()> {
            if self.eval::<bool>(script).await? {
                Ok(())
            } else {
                Err(SkenarioError::page(format!(
                    "element {selector} #{} detached before the action",
                    element.index
                )))
            }
        }
    }

    #[async_trait]
    impl BrowserDriver for ChromiumDriver {
        async fn navigate(&mut self, url: &str) -> SkenarioResult<()> {
            self.page
                .goto(url)
                .await
                .map_err(|e| SkenarioError::NavigationError {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            let landed = self.current_url().await?;
            if landed.starts_with("chrome-error://") {
                return Err(SkenarioError::NavigationError {
                    url: url.to_string(),
                    message: "page could not be loaded".to_string(),
                });
            }
            Ok(())
        }

        async fn current_url(&self) -> SkenarioResult<String> {
            let url = self
                .page
                .url()
                .await
                .map_err(|e| SkenarioError::page(e.to_string()))?;
            Ok(url.unwrap_or_else(|| "about:blank".to_string()))
        }

        async fn query(&self, selector: &Selector) -> SkenarioResult<Vec<ElementHandle>> {
            self.eval(selector.describe_script()).await
        }

        async fn fill(
            &mut self,
            selector: &Selector,
            element: &ElementHandle,
            value: &str,
        ) -> SkenarioResult<()> {
            self.act(selector, element, selector.fill_script(element.index, value))
                .await
        }

        async fn click(
            &mut self,
            selector: &Selector,
            element: &ElementHandle,
        ) -> SkenarioResult<()> {
            self.act(selector, element, selector.click_script(element.index))
                .await
        }

        async fn close(&mut self) -> SkenarioResult<()> {
            let closed = self.browser.close().await;
            if let Err(ref e) = closed {
                tracing::warn!(error = %e, "browser refused to close, killing it");
                if let Some(Err(e)) = self.browser.kill().await {
                    tracing::warn!(error = %e, "could not kill the browser");
                }
            }
            await_exit(self.browser.wait(), CLOSE_TIMEOUT).await;
            self.handle.abort();
            if let Err(e) = tokio::fs::remove_dir_all(&self.profile).await {
                tracing::debug!(error = %e, "could not remove browser profile");
            }
            closed
                .map(|_| ())
                .map_err(|e| SkenarioError::BrowserLaunchError {
                    message: e.to_string(),
                })
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{ChromiumDriver, ChromiumLauncher};
