//! Init command handler

use crate::error::{CliError, CliResult};
use crate::InitArgs;
use std::path::{Path, PathBuf};

/// Starter run configuration written by `skenario init`
pub const CONFIG_TEMPLATE: &str = r#"# Run configuration for `skenario run`.
# SKENARIO_BASE_URL, SKENARIO_LOGIN_IDENTIFIER, SKENARIO_LOGIN_SECRET and
# SKENARIO_COMMAND_TIMEOUT_MS override these values.
base_url: https://app.sbiz-app.my.id/
spec_pattern: "scenarios/**/*.{yaml,yml}"
command_timeout_ms: 10000
login:
  identifier: admin
  secret: "1234"
browser:
  headless: true
"#;

/// Starter login scenario written by `skenario init`
pub const LOGIN_SCENARIO_TEMPLATE: &str = r#"scenario: Skenario Login
cases:
  - name: Visits the login page and logs in
    steps:
      - type: navigate
        url: "${base_url}"
      - type: assert_visible
        text: APPLIKASI BIZ
      - type: fill_field
        selector: 'input[name="username"]'
        value: "${login_identifier}"
      - type: fill_field
        selector: 'input[name="password"]'
        value: "${login_secret}"
      - type: click
        selector: 'input[name="submit"]'
      - type: assert_url_contains
        substring: /home
      - type: assert_visible
        text: DASHBOARD

  - name: Stays on the login page with a wrong password
    expect_failure: assertion_timeout
    timeout_ms: 3000
    steps:
      - type: navigate
        url: "${base_url}"
      - type: fill_field
        selector: 'input[name="username"]'
        value: "${login_identifier}"
      - type: fill_field
        selector: 'input[name="password"]'
        value: not-the-password
      - type: click
        selector: 'input[name="submit"]'
      - type: assert_url_contains
        substring: /home
"#;

/// Files `init` creates, relative to the project directory
#[must_use]
pub fn init_files(root: &Path) -> [(PathBuf, &'static str); 2] {
    [
        (root.join(skenario::DEFAULT_CONFIG_FILE), CONFIG_TEMPLATE),
        (root.join("scenarios").join("login.yaml"), LOGIN_SCENARIO_TEMPLATE),
    ]
}

/// Execute the init command, returning the files written
pub fn execute_init(args: &InitArgs) -> CliResult<Vec<PathBuf>> {
    let files = init_files(&args.path);

    if !args.force {
        let existing: Vec<String> = files
            .iter()
            .filter(|(path, _)| path.exists())
            .map(|(path, _)| path.display().to_string())
            .collect();
        if !existing.is_empty() {
            return Err(CliError::invalid_argument(format!(
                "{} already exist(s); pass --force to overwrite",
                existing.join(", ")
            )));
        }
    }

    let mut written = Vec::with_capacity(files.len());
    for (path, content) in files {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        tracing::debug!(path = %path.display(), "wrote starter file");
        written.push(path);
    }
    Ok(written)
}
