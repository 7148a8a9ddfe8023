//! Output formatting utilities

use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use monitor_lib::RiskTier;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a table from a list of items
pub fn print_table<T: Tabled>(items: &[T]) {
    if items.is_empty() {
        println!("{}", "No items found".yellow());
        return;
    }
    let table = Table::new(items).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a 0..1 score as a percentage
pub fn format_percent(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

/// Paint text in the tier's dashboard color
pub fn color_tier(tier: RiskTier, text: &str) -> ColoredString {
    let (r, g, b) = tier.rgb();
    text.truecolor(r, g, b)
}

/// Horizontal bar for a risk score, `width` cells at 100%
pub fn risk_bar(risk_level: f64, width: usize) -> String {
    let filled = (risk_level.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "·".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.0), "0%");
        assert_eq!(format_percent(0.754), "75%");
        assert_eq!(format_percent(1.0), "100%");
    }

    #[test]
    fn test_risk_bar_width() {
        assert_eq!(risk_bar(0.0, 10).chars().count(), 10);
        assert_eq!(risk_bar(0.5, 10), "█████·····");
        assert_eq!(risk_bar(1.0, 4), "████");
    }

    #[test]
    fn test_risk_bar_clamps_out_of_range() {
        assert_eq!(risk_bar(-0.5, 4), "····");
        assert_eq!(risk_bar(3.0, 4), "████");
    }
}
