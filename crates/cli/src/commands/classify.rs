//! Classify a risk score without loading any data

use anyhow::Result;
use monitor_lib::{classify, Classification};
use serde::Serialize;

use super::render::{render_recommendations, render_status};
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct ClassifyOutput {
    risk_level: f64,
    #[serde(flatten)]
    classification: Classification,
}

pub fn show_classification(risk_level: f64, format: OutputFormat) -> Result<()> {
    let classification = classify(risk_level);

    match format {
        OutputFormat::Json => print_json(&ClassifyOutput {
            risk_level,
            classification,
        })?,
        OutputFormat::Table => {
            render_status(risk_level, &classification);
            println!("Color:     {}", classification.color);
            println!();
            render_recommendations(&classification);
        }
    }

    Ok(())
}
