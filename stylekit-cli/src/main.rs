//! stylekit CLI - command-line interface
//!
//! Inspects the pipeline a map style produces and manages the config file.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use commands::config::ConfigCommands;
use commands::inspect::InspectArgs;
use error::CliError;
use runner::CliRunner;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stylekit")]
#[command(version = stylekit::VERSION)]
#[command(about = "Resolve map styles and inspect the tile pipelines they produce", long_about = None)]
struct Cli {
    /// Config file (default: ~/.stylekit/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging, mirrored to stdout
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a style and its resources, then report the pipeline
    Inspect(InspectArgs),

    /// Configuration file helpers
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = dispatch(cli) {
        e.exit();
    }
}

fn dispatch(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Inspect(args) => {
            let runner = CliRunner::new(cli.config.as_deref(), cli.debug)?;
            commands::inspect::run(args, &runner)
        }
        Commands::Config(command) => commands::config::run(command, cli.config.as_deref()),
    }
}
