//! Run configuration.
//!
//! Loaded once before any scenario runs and immutable afterwards. Values are
//! layered: built-in defaults, then the YAML file, then [`ConfigOverrides`]
//! (the CLI fills these from flags and `SKENARIO_*` environment variables).
//!
//! ```yaml
//! base_url: https://app.sbiz-app.my.id/
//! spec_pattern: "scenarios/**/*.{yaml,yml}"
//! command_timeout_ms: 10000
//! login:
//!   identifier: admin
//!   secret: "1234"
//! ```

use crate::browser::BrowserConfig;
use crate::result::{SkenarioError, SkenarioResult};
use crate::wait::{WaitOptions, DEFAULT_POLL_INTERVAL_MS};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "skenario.yaml";

/// Default command timeout (10 seconds)
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 10_000;

/// Default scenario discovery pattern
pub const DEFAULT_SPEC_PATTERN: &str = "scenarios/**/*.{yaml,yml}";

const REDACTED: &str = "********";

/// Login credentials typed into the form under test.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Value typed into the username field
    #[serde(default)]
    pub identifier: String,
    /// Value typed into the password field (masked when serialized)
    #[serde(default, serialize_with = "mask_secret")]
    pub secret: String,
}

impl Credentials {
    /// Create credentials
    #[must_use]
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &REDACTED)
            .finish()
    }
}

fn mask_secret<S: Serializer>(secret: &str, serializer: S) -> Result<S::Ok, S::Error> {
    if secret.is_empty() {
        serializer.serialize_str("")
    } else {
        serializer.serialize_str(REDACTED)
    }
}

/// Immutable configuration for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Application root used by the initial navigation
    pub base_url: String,
    /// Login identifier and secret
    #[serde(default)]
    pub login: Credentials,
    /// Maximum wait for any polling step (ms)
    #[serde(default = "default_command_timeout")]
    pub command_timeout_ms: u64,
    /// Interval between polling attempts (ms)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Glob used to discover scenario files, relative to the config file
    #[serde(default = "default_spec_pattern")]
    pub spec_pattern: String,
    /// Extra named values available to scenarios as `${name}`
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Browser launch settings
    #[serde(default)]
    pub browser: BrowserConfig,
    /// Directory discovery is relative to
    #[serde(skip)]
    root: PathBuf,
}

fn default_command_timeout() -> u64 {
    DEFAULT_COMMAND_TIMEOUT_MS
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_spec_pattern() -> String {
    DEFAULT_SPEC_PATTERN.to_string()
}

/// Values that take precedence over the configuration file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Base URL override
    pub base_url: Option<String>,
    /// Login identifier override
    pub login_identifier: Option<String>,
    /// Login secret override
    pub login_secret: Option<String>,
    /// Command timeout override (ms)
    pub command_timeout_ms: Option<u64>,
    /// Spec pattern override
    pub spec_pattern: Option<String>,
    /// Run with a visible browser window
    pub headed: bool,
    /// Chromium executable override
    pub chromium_path: Option<String>,
    /// Disable the browser sandbox
    pub no_sandbox: bool,
}

impl RunConfig {
    /// Create a configuration with defaults for everything but the base URL
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            login: Credentials::default(),
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            spec_pattern: default_spec_pattern(),
            env: BTreeMap::new(),
            browser: BrowserConfig::default(),
            root: PathBuf::from("."),
        }
    }

    /// Parse a configuration from YAML; discovery is relative to `root`
    pub fn from_yaml_str(yaml: &str, root: impl Into<PathBuf>) -> SkenarioResult<Self> {
        let mut config: Self = serde_yaml_ng::from_str(yaml)?;
        config.root = root.into();
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_file(path: &Path) -> SkenarioResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            SkenarioError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        let root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        tracing::debug!(path = %path.display(), "loaded run configuration");
        Self::from_yaml_str(&yaml, root)
    }

    /// Set credentials
    #[must_use]
    pub fn with_login(mut self, identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        self.login = Credentials::new(identifier, secret);
        self
    }

    /// Set command timeout
    #[must_use]
    pub const fn with_command_timeout(mut self, timeout_ms: u64) -> Self {
        self.command_timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Set spec pattern
    #[must_use]
    pub fn with_spec_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.spec_pattern = pattern.into();
        self
    }

    /// Add a named value
    #[must_use]
    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }

    /// Set the discovery root
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Apply overrides on top of the loaded values
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(url) = overrides.base_url {
            self.base_url = url;
        }
        if let Some(identifier) = overrides.login_identifier {
            self.login.identifier = identifier;
        }
        if let Some(secret) = overrides.login_secret {
            self.login.secret = secret;
        }
        if let Some(timeout) = overrides.command_timeout_ms {
            self.command_timeout_ms = timeout;
        }
        if let Some(pattern) = overrides.spec_pattern {
            self.spec_pattern = pattern;
        }
        if overrides.headed {
            self.browser.headless = false;
        }
        if let Some(path) = overrides.chromium_path {
            self.browser.chromium_path = Some(path);
        }
        if overrides.no_sandbox {
            self.browser.sandbox = false;
        }
        self
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> SkenarioResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(SkenarioError::config(format!(
                "base_url must be an absolute http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if self.command_timeout_ms == 0 {
            return Err(SkenarioError::config("command_timeout_ms must be positive"));
        }
        if self.poll_interval_ms == 0 || self.poll_interval_ms > self.command_timeout_ms {
            return Err(SkenarioError::config(format!(
                "poll_interval_ms must be in 1..={}, got {}",
                self.command_timeout_ms, self.poll_interval_ms
            )));
        }
        if self.spec_pattern.trim().is_empty() {
            return Err(SkenarioError::config("spec_pattern must not be empty"));
        }
        Ok(())
    }

    /// Directory discovery is relative to
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Polling options derived from the timeout and interval
    #[must_use]
    pub const fn wait_options(&self) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(self.command_timeout_ms)
            .with_poll_interval(self.poll_interval_ms)
    }

    /// Named values scenarios may reference as `${name}`
    #[must_use]
    pub fn variables(&self) -> BTreeMap<String, String> {
        let mut vars = self.env.clone();
        vars.insert("base_url".to_string(), self.base_url.clone());
        vars.insert("login_identifier".to_string(), self.login.identifier.clone());
        vars.insert("login_secret".to_string(), self.login.secret.clone());
        vars
    }

    /// Join a possibly relative URL onto the base URL
    #[must_use]
    pub fn resolve_url(&self, url: &str) -> String {
        if url.contains("://") || url.starts_with("about:") {
            return url.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        let path = url.trim_start_matches('/');
        if path.is_empty() {
            format!("{base}/")
        } else {
            format!("{base}/{path}")
        }
    }
}
