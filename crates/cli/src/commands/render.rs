//! Terminal rendering of a dashboard snapshot

use chrono::Local;
use colored::Colorize;
use monitor_lib::{Classification, DashboardSnapshot, DEFAULT_LABEL_FORMAT};
use tabled::Tabled;

use crate::output::{
    color_tier, format_percent, print_error, print_info, print_success, print_table, print_warning,
    risk_bar,
};

/// Row for the risk history table
#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Risk")]
    risk: String,
    #[tabled(rename = "Tier")]
    tier: String,
    #[tabled(rename = "Trend")]
    bar: String,
}

/// Print the whole dashboard: banners, status panel, conditions, history
/// and recommendations
pub fn render_snapshot(snapshot: &DashboardSnapshot) {
    println!("{}", "Landslide Risk Dashboard".bold());
    println!("{}", "=".repeat(60));
    println!("Location:  {}", snapshot.selected_location.cyan());

    if snapshot.loading {
        print_info("Loading data...");
    }
    if snapshot.updating {
        print_info("Updating data...");
    }
    if let Some(error) = &snapshot.error {
        print_error(error);
    }
    if let Some(message) = &snapshot.update_success {
        print_success(message);
    }
    println!();

    let current = &snapshot.current;
    let Some(latest) = &current.latest else {
        print_warning("No data loaded yet");
        return;
    };

    render_status(current.risk_level, &current.classification);
    println!(
        "Updated:   {}",
        latest
            .timestamp
            .with_timezone(&Local)
            .format(DEFAULT_LABEL_FORMAT)
    );
    println!();

    println!("{}", "Conditions".bold());
    println!("{}", "-".repeat(60));
    println!("Rainfall:       {:.1} mm", latest.rainfall_mm);
    println!("Soil moisture:  {}", format_percent(latest.soil_moisture));
    println!("Temperature:    {:.1} °C", latest.temperature_c);
    println!();

    println!("{}", "Risk History".bold());
    let rows: Vec<HistoryRow> = snapshot
        .chart_series
        .iter()
        .zip(&snapshot.batch)
        .map(|(point, sample)| HistoryRow {
            time: point.label.clone(),
            risk: format_percent(point.risk_level),
            tier: color_tier(sample.status, sample.status.as_str()).to_string(),
            bar: risk_bar(point.risk_level, 20),
        })
        .collect();
    print_table(&rows);
    println!();

    render_recommendations(&current.classification);
}

/// Status line: icon, description and score in the tier color
pub fn render_status(risk_level: f64, classification: &Classification) {
    let line = format!(
        "{} {} ({})",
        classification.icon.symbol(),
        classification.description,
        format_percent(risk_level)
    );
    println!(
        "Status:    {}",
        color_tier(classification.tier, &line).bold()
    );
}

pub fn render_recommendations(classification: &Classification) {
    println!(
        "{} {}",
        "Recommendations".bold(),
        format!("[{}]", classification.alert_severity).dimmed()
    );
    println!("{}", "-".repeat(60));
    for (i, recommendation) in classification.recommendations.iter().enumerate() {
        println!(
            "{}. {}",
            i + 1,
            color_tier(classification.tier, recommendation.headline)
        );
        println!("   {}", recommendation.detail);
    }
}
