//! One-shot status command

use anyhow::Result;
use monitor_lib::controller::RefreshOutcome;
use monitor_lib::{DashboardController, SampleSource, SourceError};
use std::time::Duration;
use tracing::warn;

use super::render::render_snapshot;
use super::Settings;
use crate::output::{print_json, OutputFormat};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Load one batch for a location and print the dashboard
pub async fn show_status(settings: &Settings, location: Option<String>) -> Result<()> {
    let location = settings.config.resolve_location(location)?;
    let mut controller = DashboardController::new(settings.config.locations(), &location)?;
    let source = settings.source();

    let ticket = controller.begin_refresh();
    let result = tokio::time::timeout(FETCH_TIMEOUT, source.fetch_batch(&ticket.location))
        .await
        .unwrap_or(Err(SourceError::Timeout(FETCH_TIMEOUT)));

    let failure = match controller.complete(&ticket, result) {
        RefreshOutcome::Failed(e) => {
            warn!(location = %location, error = %e, "Sample source failed");
            Some(e)
        }
        _ => None,
    };

    let snapshot = controller.snapshot();
    match settings.format {
        OutputFormat::Json => print_json(&snapshot)?,
        OutputFormat::Table => render_snapshot(&snapshot),
    }

    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
