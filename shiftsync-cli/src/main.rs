mod commands;
mod logging;
mod render;
mod utils;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use shiftsync_core::Settings;

#[derive(Parser)]
#[command(name = "shiftsync")]
#[command(about = "Keep your calendar in sync with open, picked-up and scheduled shifts")]
struct Cli {
    /// Config file to use instead of ~/.config/shiftsync/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log more (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bring the calendar in line with the current schedule
    Sync {
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,

        /// List every shift instead of counts
        #[arg(long)]
        all: bool,
    },
    /// Show what a sync would change, without changing anything
    Status {
        /// List every shift and why open shifts were skipped
        #[arg(long)]
        all: bool,
    },
    /// Show the shifts currently believed to be on the calendar
    State,
    /// Show config paths, creating a default config file if there is none
    Config,
    /// Check that the calendar provider can create and delete events
    Verify,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let config_path = match cli.config {
        Some(path) => path,
        None => Settings::config_path()?,
    };

    match cli.command {
        Commands::Sync { json, all } => {
            commands::sync::run(&load_settings(&config_path)?, json, all).await
        }
        Commands::Status { all } => commands::status::run(&load_settings(&config_path)?, all).await,
        Commands::State => commands::state::run(&load_settings(&config_path)?),
        Commands::Config => commands::config::run(&config_path),
        Commands::Verify => commands::verify::run(&load_settings(&config_path)?).await,
    }
}

fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no config file, using defaults and environment");
    }
    Settings::load(path).with_context(|| format!("Failed to load config from {}", path.display()))
}
