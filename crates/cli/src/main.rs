//! Parking Slot Predictor CLI
//!
//! A command-line tool for querying slot predictions and server health.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{health, slots};

/// Parking Slot Predictor CLI
#[derive(Parser)]
#[command(name = "parking")]
#[command(author, version, about = "CLI for the Parking Slot Predictor", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via PARKING_API_URL env var)
    #[arg(long, env = "PARKING_API_URL", default_value = "http://localhost:8080")]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict occupied and empty slots for one or more times
    Slots {
        /// Times to predict, formatted "YYYY-MM-DD HH:MM"
        #[arg(required = true)]
        datetimes: Vec<String>,
    },

    /// Show server and component health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let client = client::ApiClient::new(&cli.api_url)?;

    match cli.command {
        Commands::Slots { datetimes } => {
            slots::show_slots(&client, &datetimes, cli.format).await?;
        }
        Commands::Health => {
            health::show_health(&client, cli.format).await?;
        }
    }

    Ok(())
}
