//! uavlink CLI - run a ground station or a simulated mover.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::mover::MoverArgs;
use commands::station::StationArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "uavlink")]
#[command(version = uavlink::VERSION)]
#[command(about = "Telemetry link between a simulated mover and a ground station", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.uavlink/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the ground station
    Station(StationArgs),

    /// Run the simulated mover
    Mover(MoverArgs),

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        e.exit();
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Config(command) => commands::config::run(command, cli.config.as_deref()),
        Commands::Station(args) => {
            let runner = CliRunner::new(cli.config.as_deref(), cli.debug)?;
            commands::station::run(args, runner).await
        }
        Commands::Mover(args) => {
            let runner = CliRunner::new(cli.config.as_deref(), cli.debug)?;
            commands::mover::run(args, runner).await
        }
    }
}
