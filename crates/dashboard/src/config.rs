//! Dashboard configuration
//!
//! Read from an optional `dashboard.toml` in the working directory, then
//! overridden by `DASHBOARD_*` environment variables. Every key has a
//! default, so both sources are optional.

use anyhow::{Context, Result};
use monitor_lib::models::{BATCH_SIZE, DEFAULT_LABEL_FORMAT, DEFAULT_LOCATIONS, SAMPLE_INTERVAL};
use monitor_lib::{SessionConfig, SyntheticSource};
use serde::Deserialize;
use std::time::Duration;

/// Dashboard configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Name attached to every log event
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// Address the HTTP view binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port for the HTTP view, health and metrics
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Selectable monitoring locations (`DASHBOARD_LOCATIONS=PONTO-A,PONTO-B`)
    #[serde(default = "default_locations")]
    pub locations: Vec<String>,

    /// Location shown on start-up, the first configured location when unset
    #[serde(default)]
    pub initial_location: Option<String>,

    /// Automatic refresh period in seconds
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Upper bound for one fetch in seconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Seconds the manual refresh confirmation stays up, 0 keeps it until dismissed
    #[serde(default = "default_update_success_ttl")]
    pub update_success_ttl_secs: u64,

    /// Samples per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Spacing between synthetic samples in seconds
    #[serde(default = "default_sample_interval")]
    pub sample_interval_secs: u64,

    /// Seed for reproducible synthetic data
    #[serde(default)]
    pub seed: Option<u64>,

    /// Probability that a synthetic fetch fails
    #[serde(default)]
    pub failure_rate: f64,
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "landslide-dashboard".to_string())
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_locations() -> Vec<String> {
    DEFAULT_LOCATIONS.iter().map(|l| l.to_string()).collect()
}

fn default_refresh_interval() -> u64 {
    30
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_update_success_ttl() -> u64 {
    5
}

fn default_batch_size() -> usize {
    BATCH_SIZE
}

fn default_sample_interval() -> u64 {
    SAMPLE_INTERVAL.as_secs()
}

impl DashboardConfig {
    /// Load configuration from `dashboard.toml` and the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("dashboard").required(false))
            .add_source(
                config::Environment::with_prefix("DASHBOARD")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("locations"),
            )
            .build()
            .context("Failed to read dashboard configuration")?;

        Self::validated(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(content, config::FileFormat::Toml))
            .build()
            .context("Failed to parse dashboard configuration")?;

        Self::validated(config)
    }

    fn validated(config: config::Config) -> Result<Self> {
        let config: Self = config
            .try_deserialize()
            .context("Invalid dashboard configuration")?;

        anyhow::ensure!(
            !config.locations.is_empty(),
            "At least one monitoring location must be configured"
        );
        if let Some(initial) = &config.initial_location {
            anyhow::ensure!(
                config.locations.contains(initial),
                "Initial location {} is not one of the configured locations",
                initial
            );
        }
        anyhow::ensure!(config.batch_size > 0, "Batch size must be greater than zero");
        anyhow::ensure!(
            config.sample_interval_secs > 0,
            "Sample interval must be greater than zero"
        );

        Ok(config)
    }

    /// Location shown on start-up
    pub fn initial_location(&self) -> &str {
        self.initial_location
            .as_deref()
            .or_else(|| self.locations.first().map(String::as_str))
            .unwrap_or(DEFAULT_LOCATIONS[0])
    }

    /// Settings for the refresh session
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            locations: self.locations.clone(),
            initial_location: self.initial_location().to_string(),
            refresh_interval: Duration::from_secs(self.refresh_interval_secs),
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            update_success_ttl: match self.update_success_ttl_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            batch_size: self.batch_size,
            label_format: DEFAULT_LABEL_FORMAT.to_string(),
            ..SessionConfig::default()
        }
    }

    /// Synthetic source matching this configuration
    pub fn synthetic_source(&self) -> SyntheticSource {
        let source = match self.seed {
            Some(seed) => SyntheticSource::with_seed(seed),
            None => SyntheticSource::new(),
        };

        source
            .batch_size(self.batch_size)
            .interval(Duration::from_secs(self.sample_interval_secs))
            .failure_rate(self.failure_rate)
    }
}
