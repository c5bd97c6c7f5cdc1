//! Config command handler

use crate::error::{CliError, CliResult};
use crate::runner::load_run_config;
use crate::ConfigArgs;
use skenario::RunConfig;

/// Execute the config command: print the effective configuration
pub fn execute_config(args: &ConfigArgs) -> CliResult<()> {
    let config = load_run_config(&args.source, args.source.overrides())?;
    print!("{}", render_config(&config, args.json)?);
    Ok(())
}

/// Render the configuration as YAML or JSON; the login secret is masked
pub fn render_config(config: &RunConfig, json: bool) -> CliResult<String> {
    if json {
        let mut out = serde_json::to_string_pretty(config)
            .map_err(|e| CliError::config(format!("cannot render configuration: {e}")))?;
        out.push('\n');
        Ok(out)
    } else {
        serde_yaml_ng::to_string(config)
            .map_err(|e| CliError::config(format!("cannot render configuration: {e}")))
    }
}
