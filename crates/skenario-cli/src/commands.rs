//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use skenario::{ConfigOverrides, ReportFormat, DEFAULT_CONFIG_FILE};
use std::path::PathBuf;

/// Skenario: run scripted browser scenarios against a live web application
#[derive(Parser, Debug)]
#[command(name = "skenario")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios in a browser
    Run(RunArgs),

    /// List discovered scenarios and their cases
    List(ListArgs),

    /// Parse and validate scenario files without a browser
    Validate(SourceArgs),

    /// Show the effective configuration (secret redacted)
    Config(ConfigArgs),

    /// Write a starter configuration and login scenario
    Init(InitArgs),
}

/// Where the run configuration comes from, and what overrides it
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Configuration file
    #[arg(short, long, env = "SKENARIO_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Scenario discovery pattern (glob, `{a,b}` alternations allowed)
    #[arg(long = "spec", env = "SKENARIO_SPEC_PATTERN")]
    pub spec_pattern: Option<String>,

    /// Application base URL
    #[arg(long, env = "SKENARIO_BASE_URL")]
    pub base_url: Option<String>,

    /// Login identifier typed into the username field
    #[arg(long, env = "SKENARIO_LOGIN_IDENTIFIER")]
    pub login_identifier: Option<String>,

    /// Login secret typed into the password field
    #[arg(long, env = "SKENARIO_LOGIN_SECRET", hide_env_values = true)]
    pub login_secret: Option<String>,

    /// Command timeout in milliseconds
    #[arg(long = "timeout", env = "SKENARIO_COMMAND_TIMEOUT_MS")]
    pub command_timeout_ms: Option<u64>,
}

impl SourceArgs {
    /// Overrides for the configuration file
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.base_url.clone(),
            login_identifier: self.login_identifier.clone(),
            login_secret: self.login_secret.clone(),
            command_timeout_ms: self.command_timeout_ms,
            spec_pattern: self.spec_pattern.clone(),
            ..ConfigOverrides::default()
        }
    }
}

/// Arguments for the run command
#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    /// Configuration source
    #[command(flatten)]
    pub source: SourceArgs,

    /// Only run cases whose name contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Chromium executable
    #[arg(long, env = "SKENARIO_CHROMIUM_PATH")]
    pub chromium_path: Option<String>,

    /// Disable the browser sandbox (containers/CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Stop after the first failed case
    #[arg(long)]
    pub fail_fast: bool,

    /// Directory for report files
    #[arg(short = 'o', long, default_value = "target/skenario")]
    pub report_dir: PathBuf,

    /// Report format
    #[arg(long, default_value = "both")]
    pub format: ReportFormatArg,
}

impl RunArgs {
    /// Overrides including browser settings
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            headed: self.headed,
            chromium_path: self.chromium_path.clone(),
            no_sandbox: self.no_sandbox,
            ..self.source.overrides()
        }
    }
}

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Configuration source
    #[command(flatten)]
    pub source: SourceArgs,

    /// Only list cases whose name contains this text
    #[arg(short, long)]
    pub filter: Option<String>,
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Configuration source
    #[command(flatten)]
    pub source: SourceArgs,

    /// Print as JSON instead of YAML
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Project directory (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing files
    #[arg(short, long)]
    pub force: bool,
}

/// Report format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormatArg {
    /// report.json
    Json,
    /// junit.xml
    Junit,
    /// Both files
    #[default]
    Both,
}

impl From<ReportFormatArg> for ReportFormat {
    fn from(arg: ReportFormatArg) -> Self {
        match arg {
            ReportFormatArg::Json => Self::Json,
            ReportFormatArg::Junit => Self::Junit,
            ReportFormatArg::Both => Self::Both,
        }
    }
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
