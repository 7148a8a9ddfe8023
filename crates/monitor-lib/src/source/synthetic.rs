//! Synthetic sample generation
//!
//! Produces plausible random readings for any location. Stands in for a
//! real telemetry feed until one exists.

use super::{async_trait, SampleSource, SourceError};
use crate::models::{RiskSample, BATCH_SIZE, SAMPLE_INTERVAL};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// Rainfall upper bound in millimeters (exclusive)
const MAX_RAINFALL_MM: f64 = 50.0;

/// Temperature range in degrees Celsius
const MIN_TEMPERATURE_C: f64 = 20.0;
const TEMPERATURE_SPAN_C: f64 = 10.0;

/// Random sample source
pub struct SyntheticSource {
    rng: Mutex<StdRng>,
    batch_size: usize,
    interval: Duration,
    failure_rate: f64,
}

impl SyntheticSource {
    /// Create a generator seeded from system entropy
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Create a generator with reproducible output
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            batch_size: BATCH_SIZE,
            interval: SAMPLE_INTERVAL,
            failure_rate: 0.0,
        }
    }

    /// Set the number of samples per batch
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Set the spacing between consecutive samples
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Make `fetch_batch` fail with the given probability (clamped to 0..=1)
    pub fn failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) };
        self
    }

    /// Generate a batch ending at the current time
    pub fn generate(&self, location: &str) -> Vec<RiskSample> {
        self.generate_at(location, Utc::now())
    }

    /// Generate a batch whose newest sample is stamped `now`
    pub fn generate_at(&self, location: &str, now: DateTime<Utc>) -> Vec<RiskSample> {
        let step = chrono::Duration::from_std(self.interval)
            .unwrap_or_else(|_| chrono::Duration::seconds(SAMPLE_INTERVAL.as_secs() as i64));
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        (0..self.batch_size)
            .map(|i| {
                let risk_level: f64 = rng.gen();
                RiskSample::new(
                    i as u32,
                    now - step * i as i32,
                    location,
                    rng.gen_range(0.0..MAX_RAINFALL_MM),
                    rng.gen(),
                    MIN_TEMPERATURE_C + rng.gen::<f64>() * TEMPERATURE_SPAN_C,
                    risk_level,
                )
            })
            .collect()
    }

    fn should_fail(&self) -> bool {
        if self.failure_rate <= 0.0 {
            return false;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_bool(self.failure_rate)
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SampleSource for SyntheticSource {
    async fn fetch_batch(&self, location: &str) -> Result<Vec<RiskSample>, SourceError> {
        if self.should_fail() {
            return Err(SourceError::Unavailable(format!(
                "simulated outage for {}",
                location
            )));
        }

        let batch = self.generate(location);
        debug!(location = %location, samples = batch.len(), "Generated synthetic batch");
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::source::validate_batch;

    #[test]
    fn test_generated_batch_shape() {
        let source = SyntheticSource::with_seed(42);

        for _ in 0..50 {
            let batch = source.generate("PONTO-A");

            assert_eq!(batch.len(), 10);
            for pair in batch.windows(2) {
                assert!(pair[0].timestamp > pair[1].timestamp);
                assert_eq!(
                    pair[0].timestamp - pair[1].timestamp,
                    chrono::Duration::seconds(30)
                );
            }
            for (i, sample) in batch.iter().enumerate() {
                assert_eq!(sample.id, i as u32);
                assert_eq!(sample.location, "PONTO-A");
                assert_eq!(sample.status, classify(sample.risk_level).tier);
            }
        }
    }

    #[test]
    fn test_generated_values_in_range() {
        let source = SyntheticSource::with_seed(7);

        for sample in (0..20).flat_map(|_| source.generate("PONTO-B")) {
            assert!((0.0..1.0).contains(&sample.risk_level));
            assert!((0.0..1.0).contains(&sample.soil_moisture));
            assert!((0.0..50.0).contains(&sample.rainfall_mm));
            assert!((20.0..30.0).contains(&sample.temperature_c));
        }
    }

    #[test]
    fn test_generated_batch_satisfies_contract() {
        let source = SyntheticSource::with_seed(1);
        let batch = source.generate("PONTO-A");
        assert!(validate_batch(&batch, "PONTO-A", BATCH_SIZE).is_ok());
    }

    #[test]
    fn test_same_seed_same_values() {
        let now = Utc::now();
        let a = SyntheticSource::with_seed(99).generate_at("PONTO-A", now);
        let b = SyntheticSource::with_seed(99).generate_at("PONTO-A", now);
        assert_eq!(a, b);
    }

    #[test]
    fn test_custom_batch_size_and_interval() {
        let source = SyntheticSource::with_seed(3)
            .batch_size(4)
            .interval(Duration::from_secs(60));
        let batch = source.generate("PONTO-A");

        assert_eq!(batch.len(), 4);
        assert_eq!(
            batch[0].timestamp - batch[1].timestamp,
            chrono::Duration::seconds(60)
        );
    }

    #[tokio::test]
    async fn test_fetch_batch_succeeds_without_failure_rate() {
        let source = SyntheticSource::with_seed(5);
        let batch = source.fetch_batch("PONTO-B").await.unwrap();
        assert_eq!(batch.len(), 10);
        assert!(batch.iter().all(|s| s.location == "PONTO-B"));
    }

    #[tokio::test]
    async fn test_fetch_batch_always_fails_at_full_failure_rate() {
        let source = SyntheticSource::with_seed(5).failure_rate(1.0);
        let err = source.fetch_batch("PONTO-A").await.unwrap_err();
        assert!(matches!(err, SourceError::Unavailable(_)));
    }

    #[test]
    fn test_failure_rate_is_clamped() {
        let source = SyntheticSource::with_seed(5).failure_rate(3.0);
        assert_eq!(source.failure_rate, 1.0);
        let source = SyntheticSource::with_seed(5).failure_rate(-1.0);
        assert_eq!(source.failure_rate, 0.0);
    }
}
