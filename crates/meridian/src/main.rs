//! Meridian command-line interface
//!
//! Derives schemas from class definitions, exports them as JSON, and checks
//! labeled arrays, datasets and dicts against them.

use anyhow::Result;
use clap::{Parser, Subcommand};
use meridian_logging::{init_logging, LogConfig};
use std::process::ExitCode;

mod cli;

use cli::check::CheckArgs;
use cli::config::{Config, ConfigArgs};
use cli::schema::SchemaAction;

#[derive(Parser, Debug)]
#[command(name = "meridian", about = "Schema checks for labeled arrays and datasets", version)]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Derive and inspect schemas
    Schema {
        #[command(subcommand)]
        action: SchemaAction,
    },

    /// Check a value document against a schema
    Check(CheckArgs),

    /// Show resolved paths and settings
    Config(ConfigArgs),
}

fn command_wants_json(command: &Commands) -> bool {
    match command {
        Commands::Schema { action } => action.wants_json(),
        Commands::Check(args) => args.json,
        Commands::Config(args) => args.json,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_mode = command_wants_json(&cli.command);

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            let err = anyhow::Error::new(err);
            if json_mode {
                cli::error::print_json_error(&err);
            } else {
                eprintln!("{:?}", err);
            }
            return ExitCode::from(1);
        }
    };

    let log_config = LogConfig {
        verbose: cli.verbose,
        filter: config.logging.filter.as_deref(),
        file: config.logging.file,
        ..LogConfig::new("meridian")
    };
    if let Err(err) = init_logging(log_config) {
        eprintln!("Warning: failed to initialize logging: {:#}", err);
    }

    match run_command(cli.command, &config) {
        Ok(code) => code,
        Err(err) => {
            if json_mode {
                cli::error::print_json_error(&err);
            } else {
                eprintln!("{:?}", err);
            }
            ExitCode::from(1)
        }
    }
}

fn run_command(command: Commands, config: &Config) -> Result<ExitCode> {
    match command {
        Commands::Schema { action } => cli::schema::run(action).map(|()| ExitCode::SUCCESS),
        Commands::Check(args) => cli::check::run(args, config),
        Commands::Config(args) => cli::config::run(args, config).map(|()| ExitCode::SUCCESS),
    }
}
