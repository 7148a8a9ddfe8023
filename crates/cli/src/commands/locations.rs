//! List monitoring locations

use anyhow::Result;
use serde::Serialize;
use tabled::Tabled;

use super::Settings;
use crate::output::{print_json, print_table, OutputFormat};

#[derive(Tabled, Serialize)]
struct LocationRow {
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Default")]
    #[serde(rename = "default")]
    is_default: bool,
}

pub fn list_locations(settings: &Settings) -> Result<()> {
    let default = settings.config.resolve_location(None)?;
    let rows: Vec<LocationRow> = settings
        .config
        .locations()
        .into_iter()
        .map(|location| LocationRow {
            is_default: location == default,
            location,
        })
        .collect();

    match settings.format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Table => print_table(&rows),
    }

    Ok(())
}
