// crates/synthex-cli/src/main.rs
//
// CLI entrypoint for the Synthex protocol tools.
//
// Replays scenario files against an in-memory system and prints the
// collateral supply schedule.

mod commands;
mod config;
mod output;
mod scenario;

use clap::{Parser, Subcommand};
use commands::replay::ReplayCmd;
use commands::schedule::ScheduleCmd;
use output::OutputFormat;

/// Synthex protocol CLI.
#[derive(Parser, Debug)]
#[command(
    name = "synthex",
    version = "0.1.0",
    about = "Synthex protocol tools: scenario replay and supply schedule"
)]
struct Cli {
    /// Path to the TOML system configuration.
    #[arg(long, global = true, default_value = "~/.synthex/config.toml")]
    config: String,

    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a scenario file and print events and balances.
    Replay(ReplayCmd),

    /// Print the weekly collateral supply schedule.
    Schedule(ScheduleCmd),

    /// Print the effective system configuration.
    Config,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber for structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let system_config = config::load_or_default(&cli.config);
    let format = OutputFormat::from_flag(cli.json);

    match &cli.command {
        Commands::Replay(cmd) => commands::replay::run(cmd, system_config, format)?,
        Commands::Schedule(cmd) => commands::schedule::run(cmd, system_config, format)?,
        Commands::Config => commands::config::run(&system_config, format)?,
    }

    Ok(())
}
