//! Landslide Dashboard - risk monitoring daemon
//!
//! Refreshes the landslide risk batch for the selected monitoring location
//! every 30 seconds and serves the dashboard state over HTTP.

use anyhow::{Context, Result};
use landslide_dashboard::{api, config::DashboardConfig};
use monitor_lib::{
    health::{components, HealthRegistry},
    observability::{DashboardMetrics, StructuredLogger},
    SessionBuilder,
};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DASHBOARD_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting landslide-dashboard");

    let config = DashboardConfig::load()?;
    info!(
        instance = %config.instance_name,
        locations = ?config.locations,
        "Dashboard configured"
    );

    let health_registry = HealthRegistry::new();
    health_registry.register(components::SAMPLE_SOURCE).await;
    health_registry.register(components::REFRESH_LOOP).await;

    let metrics = DashboardMetrics::new();

    let logger = StructuredLogger::new(&config.instance_name);
    logger.log_startup(
        DASHBOARD_VERSION,
        config.initial_location(),
        config.refresh_interval_secs,
    );

    let session = SessionBuilder::new()
        .source(Arc::new(config.synthetic_source()))
        .config(config.session_config())
        .metrics(metrics.clone())
        .health(health_registry.clone())
        .logger(logger.clone())
        .start()
        .context("Failed to start dashboard session")?;

    let app_state = Arc::new(api::AppState::new(
        health_registry.clone(),
        metrics,
        session.handle(),
    ));

    let (stop_api, api_stopped) = oneshot::channel::<()>();
    let bind_address = config.bind_address.clone();
    let api_port = config.api_port;
    let api_handle = tokio::spawn(async move {
        api::serve(&bind_address, api_port, app_state, async {
            let _ = api_stopped.await;
        })
        .await
    });

    tokio::signal::ctrl_c().await?;
    logger.log_shutdown("SIGINT received");

    health_registry.set_ready(false).await;
    session.shutdown().await;

    let _ = stop_api.send(());
    match api_handle.await {
        Ok(Err(e)) => error!(error = %e, "API server failed"),
        Err(e) => error!(error = %e, "API server task panicked"),
        Ok(Ok(())) => {}
    }

    info!("Shutdown complete");
    Ok(())
}
