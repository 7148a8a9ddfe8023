//! Landslide risk monitor CLI
//!
//! A command-line view of the landslide risk dashboard: one-shot status,
//! a live watch mode, and score classification.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{classify, locations, status, watch, Settings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Landslide risk monitor CLI
#[derive(Parser)]
#[command(name = "landslide")]
#[command(author, version, about = "CLI for the Landslide Risk Monitor", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, short, global = true, default_value = "table")]
    pub format: output::OutputFormat,

    /// Seed for reproducible synthetic data
    #[arg(long, global = true, env = "LANDSLIDE_SEED")]
    pub seed: Option<u64>,

    /// Probability (0-1) that a synthetic fetch fails
    #[arg(long, global = true, env = "LANDSLIDE_FAILURE_RATE")]
    pub failure_rate: Option<f64>,

    /// Config file (default: ~/.config/landslide/config.json)
    #[arg(long, global = true, env = "LANDSLIDE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the latest readings once and show the dashboard
    Status {
        /// Monitoring location (default: configured default)
        #[arg(long, short)]
        location: Option<String>,
    },

    /// Live dashboard that refreshes on a timer
    Watch {
        /// Monitoring location to start with
        #[arg(long, short)]
        location: Option<String>,

        /// Automatic refresh period in seconds
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Classify a risk score between 0 and 1
    Classify {
        /// Risk score
        #[arg(allow_negative_numbers = true)]
        risk: f64,
    },

    /// List monitoring locations
    Locations,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = match &cli.config {
        Some(path) => config::Config::load_from(path)?,
        None => config::Config::load()?,
    };
    let settings = Settings::new(config, cli.format, cli.seed, cli.failure_rate);

    match cli.command {
        Commands::Status { location } => {
            status::show_status(&settings, location).await?;
        }
        Commands::Watch { location, interval } => {
            watch::watch(&settings, location, interval).await?;
        }
        Commands::Classify { risk } => {
            classify::show_classification(risk, settings.format)?;
        }
        Commands::Locations => {
            locations::list_locations(&settings)?;
        }
    }

    Ok(())
}
