mod cli;
mod commands;
mod config;
mod event_reporter;
mod formatters;
mod tables;
mod terminal_progress_reporter;

use std::process;

use clap::Parser;
use gitdeps::{config::loader::ApplyToConfg, fs::RealFileSystem};
use terminal_progress_reporter::TerminalProgressReporter;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::{cli::ClapCli, commands::dispatch_command};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ClapCli::parse();
    init_tracing(args.verbose);
    debug!("CLI arguments: {:#?}", &args);

    let fs = RealFileSystem;

    // Use `config` for most things; use `original_config` for `config validate`, where we want to
    // deal strictly with the config file.
    let (config, original_config) = {
        // 1. Load config.yaml (or defaults)
        let config = config::load_config(&fs)?;

        // 2. Apply CLI args to config (overriding)
        (args.apply_to_config(config.clone()), config)
    };

    debug!("Final config: {:#?}", &config);

    let reporter = TerminalProgressReporter::new(config.use_colors());

    // 3. Dispatch and execute the requested command
    let exit_code = dispatch_command(&args.command, &config, &original_config, reporter).await;

    process::exit(exit_code)
}
