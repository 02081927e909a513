//! tablesplit command line
//!
//! - `compose`: compose a declaration and print the frozen schema
//! - `check`: validate a declaration, exit non-zero on the first violation
//! - `group`: group expense records and print finance statistics
//! - `config`: show the effective configuration

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tablesplit_logging::{init_logging, LogConfig};
use tracing::debug;

mod cli;

use cli::config::CliConfig;

#[derive(Parser, Debug)]
#[command(
    name = "tablesplit",
    version,
    about = "Compose table-splitting schemas from partition declarations"
)]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compose a declaration and print the resulting schema
    Compose(cli::compose::ComposeArgs),

    /// Validate a declaration without printing the schema
    Check(cli::check::CheckArgs),

    /// Group expense records and print finance statistics
    Group(cli::group::GroupArgs),

    /// Show the effective configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn command_wants_json(command: &Commands) -> bool {
    match command {
        Commands::Compose(args) => args.json,
        Commands::Check(_) => false,
        Commands::Group(args) => args.json,
        Commands::Config { json } => *json,
    }
}

fn run_command(command: Commands, config: &CliConfig) -> Result<()> {
    match command {
        Commands::Compose(args) => cli::compose::run(args, config),
        Commands::Check(args) => cli::check::run(args, config),
        Commands::Group(args) => cli::group::run(args),
        Commands::Config { json } => cli::config::run(cli::config::ConfigArgs { json }, config),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_mode = command_wants_json(&cli.command);

    let config = match CliConfig::load() {
        Ok(config) => config,
        Err(err) => {
            report(&err, json_mode);
            return ExitCode::from(1);
        }
    };

    let _log_guard = match init_logging(LogConfig {
        app_name: "tablesplit",
        verbose: cli.verbose,
        log_dir: config.log_dir(),
    }) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Warning: failed to initialize logging: {:#}", err);
            None
        }
    };
    debug!(?config, "Loaded configuration");

    match run_command(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err, json_mode);
            ExitCode::from(1)
        }
    }
}

fn report(err: &anyhow::Error, json_mode: bool) {
    if json_mode {
        cli::error::print_json_error(err);
    } else if let Some(helpful) = err.downcast_ref::<cli::error::HelpfulError>() {
        eprint!("{}", helpful);
    } else {
        eprintln!("{:?}", err);
    }
}
