//! Data-library dashboard CLI.

use clap::{ColorChoice, Parser};
use datalib_cli::logging::{LogConfig, init_logging};
use std::io::{self, IsTerminal};

mod cli;
mod commands;

use datalib_client::ApiConfig;

use crate::cli::{Cli, Command};
use crate::commands::{run_columns, run_export, run_fetch, run_summary, run_views};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let config = api_config_from_cli(&cli);
    let outcome = match &cli.command {
        Command::Fetch(args) => run_fetch(args, config).await,
        Command::Columns(args) => run_columns(args, config).await,
        Command::Export(args) => run_export(args, config).await,
        Command::Summary(args) => run_summary(args, config).await,
        Command::Views => run_views(),
    };
    let exit_code = match outcome {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !cli.verbosity.is_present();
    config.format = cli.log_format.into();
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}

fn api_config_from_cli(cli: &Cli) -> ApiConfig {
    match &cli.api_url {
        Some(url) => ApiConfig::new(url.clone()),
        None => ApiConfig::default(),
    }
}
