//! Server health CLI command

use anyhow::Result;
use colored::Colorize;

use crate::client::{ApiClient, HealthStatus};
use crate::output::{color_status, OutputFormat};

/// Show overall and per-component health of the server
pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health: HealthStatus = client.get("healthz").await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&health)?);
        }
        OutputFormat::Table => {
            println!("{} {}", "Server:".bold(), color_status(&health.status));

            let mut names: Vec<&String> = health.components.keys().collect();
            names.sort();
            for name in names {
                let component = &health.components[name];
                print!("  {:<18} {}", name, color_status(&component.status));
                if let Some(message) = &component.message {
                    print!(" ({})", message);
                }
                if component.consecutive_failures > 0 {
                    print!(" [{} consecutive failures]", component.consecutive_failures);
                }
                println!();
            }
        }
    }

    Ok(())
}
