//! Configuration management for the CLI

use anyhow::{Context, Result};
use monitor_lib::models::DEFAULT_LOCATIONS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration, stored as JSON in `~/.config/landslide/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Selectable monitoring locations
    pub locations: Option<Vec<String>>,
    /// Location used when `--location` is not given
    pub default_location: Option<String>,
    /// Seed for reproducible synthetic data
    pub seed: Option<u64>,
    /// Probability that a synthetic fetch fails
    pub failure_rate: Option<f64>,
    /// Automatic refresh period for `watch`, in seconds
    pub refresh_interval_secs: Option<u64>,
}

impl Config {
    /// Load configuration from the default file, if present
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    /// Configured locations, or the built-in set
    pub fn locations(&self) -> Vec<String> {
        match &self.locations {
            Some(locations) if !locations.is_empty() => locations.clone(),
            _ => DEFAULT_LOCATIONS.iter().map(|l| l.to_string()).collect(),
        }
    }

    /// Pick the location to show: explicit choice, then configured default,
    /// then the first configured location
    pub fn resolve_location(&self, requested: Option<String>) -> Result<String> {
        let locations = self.locations();
        let location = requested
            .or_else(|| self.default_location.clone())
            .or_else(|| locations.first().cloned())
            .context("No monitoring locations configured")?;

        anyhow::ensure!(
            locations.contains(&location),
            "unknown location: {} (known: {})",
            location,
            locations.join(", ")
        );
        Ok(location)
    }

    /// Get the configuration file path
    fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("landslide").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();

        assert!(config.seed.is_none());
        assert_eq!(config.locations(), vec!["PONTO-A", "PONTO-B"]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"locations": ["PONTO-C", "PONTO-D"], "default_location": "PONTO-D", "seed": 9}}"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();

        assert_eq!(config.locations(), vec!["PONTO-C", "PONTO-D"]);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.resolve_location(None).unwrap(), "PONTO-D");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        assert!(Config::load_from(file.path()).is_err());
    }

    #[test]
    fn test_resolve_location_order() {
        let config = Config::default();
        assert_eq!(config.resolve_location(None).unwrap(), "PONTO-A");
        assert_eq!(
            config.resolve_location(Some("PONTO-B".to_string())).unwrap(),
            "PONTO-B"
        );
    }

    #[test]
    fn test_resolve_unknown_location() {
        let err = Config::default()
            .resolve_location(Some("PONTO-Z".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("unknown location: PONTO-Z"));
    }

    #[test]
    fn test_empty_locations_fall_back_to_defaults() {
        let config = Config {
            locations: Some(Vec::new()),
            ..Config::default()
        };
        assert_eq!(config.locations().len(), 2);
    }
}
