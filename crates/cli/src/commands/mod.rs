//! CLI commands

pub mod classify;
pub mod locations;
pub mod render;
pub mod status;
pub mod watch;

use crate::config::Config;
use crate::output::OutputFormat;
use monitor_lib::SyntheticSource;

/// Settings shared by every command, merged from flags and the config file
pub struct Settings {
    pub config: Config,
    pub format: OutputFormat,
    pub seed: Option<u64>,
    pub failure_rate: f64,
}

impl Settings {
    pub fn new(
        config: Config,
        format: OutputFormat,
        seed: Option<u64>,
        failure_rate: Option<f64>,
    ) -> Self {
        let seed = seed.or(config.seed);
        let failure_rate = failure_rate.or(config.failure_rate).unwrap_or(0.0);

        Self {
            config,
            format,
            seed,
            failure_rate,
        }
    }

    /// Synthetic sample source for these settings
    pub fn source(&self) -> SyntheticSource {
        let source = match self.seed {
            Some(seed) => SyntheticSource::with_seed(seed),
            None => SyntheticSource::new(),
        };
        source.failure_rate(self.failure_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config_file() {
        let config = Config {
            seed: Some(1),
            failure_rate: Some(0.5),
            ..Config::default()
        };

        let settings = Settings::new(config, OutputFormat::Json, Some(2), None);

        assert_eq!(settings.seed, Some(2));
        assert_eq!(settings.failure_rate, 0.5);
    }

    #[test]
    fn test_defaults_without_config() {
        let settings = Settings::new(Config::default(), OutputFormat::Table, None, None);

        assert_eq!(settings.seed, None);
        assert_eq!(settings.failure_rate, 0.0);
    }
}
