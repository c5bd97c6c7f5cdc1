//! Skenario CLI: run scripted browser scenarios
//!
//! ## Usage
//!
//! ```bash
//! skenario init                      # Write skenario.yaml and a login scenario
//! skenario validate                  # Check scenario files without a browser
//! skenario run                       # Run every discovered scenario
//! skenario run --filter "logs in"    # Run matching cases only
//! skenario config --json             # Show the effective configuration
//! ```

use clap::Parser;
use skenario_cli::{
    handlers, logging, Cli, CliConfig, CliError, CliResult, Commands, InitArgs, ProgressReporter,
    RunArgs, TestRunner, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let config = build_config(&cli);
    logging::init(config.verbosity, config.color.should_color());

    match cli.command {
        Commands::Run(args) => run_scenarios(config, &args),
        Commands::List(args) => handlers::execute_list(&args),
        Commands::Validate(source) => {
            let verdict = handlers::execute_validate(&source)?;
            println!("{verdict}");
            Ok(())
        }
        Commands::Config(args) => handlers::execute_config(&args),
        Commands::Init(args) => run_init(&config, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.clone().into())
}

fn run_scenarios(config: CliConfig, args: &RunArgs) -> CliResult<()> {
    let mut runner = TestRunner::new(config);
    let report = runner.run(args)?;
    if report.all_passed() {
        Ok(())
    } else {
        Err(CliError::CasesFailed {
            failed: report.totals.failed,
            total: report.totals.total,
        })
    }
}

fn run_init(config: &CliConfig, args: &InitArgs) -> CliResult<()> {
    let reporter = ProgressReporter::new(
        config.color.should_color(),
        config.verbosity.is_quiet(),
    );
    for path in handlers::execute_init(args)? {
        reporter.success(&format!("Created {}", path.display()));
    }
    reporter.info("Edit skenario.yaml, then run `skenario validate` and `skenario run`");
    Ok(())
}
