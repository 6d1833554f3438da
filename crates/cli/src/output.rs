//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Occupancy as a percentage of capacity, e.g. "53%"
pub fn format_occupancy(occupied: u32, total: u32) -> String {
    if total == 0 {
        return "-".to_string();
    }
    format!("{:.0}%", occupied as f64 / total as f64 * 100.0)
}

/// Color occupancy: green with room to spare, red when nearly full
pub fn color_occupancy(occupied: u32, total: u32) -> String {
    let formatted = format_occupancy(occupied, total);
    if total == 0 {
        return formatted;
    }
    let ratio = occupied as f64 / total as f64;
    if ratio >= 0.9 {
        formatted.red().to_string()
    } else if ratio >= 0.6 {
        formatted.yellow().to_string()
    } else {
        formatted.green().to_string()
    }
}

/// Facility label for a record id; the degraded record has none
pub fn facility_label(id: Option<u32>) -> String {
    match id {
        Some(1) => "A".to_string(),
        Some(2) => "B".to_string(),
        Some(other) => other.to_string(),
        None => "-".to_string(),
    }
}

/// Color status based on value
pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "healthy" => status.green().to_string(),
        "degraded" => status.yellow().to_string(),
        "unhealthy" => status.red().to_string(),
        _ => status.to_string(),
    }
}
