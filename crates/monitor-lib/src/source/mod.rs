//! Sample sources
//!
//! A sample source produces the batch of readings shown for one location.
//! The synthetic generator stands in for a telemetry feed; any real feed
//! plugs in behind the same [`SampleSource`] trait.

mod synthetic;

pub use synthetic::SyntheticSource;

use crate::models::RiskSample;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

pub use async_trait::async_trait;

/// Errors a sample source or batch check can produce
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    /// The source could not produce a batch
    #[error("sample source unavailable: {0}")]
    Unavailable(String),
    /// The source did not answer within the fetch timeout
    #[error("sample source timed out after {0:?}")]
    Timeout(Duration),
    /// The source answered with a batch that breaks the batch contract
    #[error("invalid batch: {0}")]
    InvalidBatch(String),
}

/// Trait for sample source implementations
#[async_trait]
pub trait SampleSource: Send + Sync {
    /// Fetch the latest batch for a location, newest sample first
    async fn fetch_batch(&self, location: &str) -> Result<Vec<RiskSample>, SourceError>;
}

/// Check a batch against the contract every source must honour
///
/// The batch must hold exactly `expected_len` samples for `location`, with
/// distinct ids, strictly decreasing timestamps, values in range and a
/// status that agrees with the classifier.
pub fn validate_batch(
    batch: &[RiskSample],
    location: &str,
    expected_len: usize,
) -> Result<(), SourceError> {
    if batch.len() != expected_len {
        return Err(SourceError::InvalidBatch(format!(
            "expected {} samples, got {}",
            expected_len,
            batch.len()
        )));
    }

    let mut ids = HashSet::with_capacity(batch.len());
    for (index, sample) in batch.iter().enumerate() {
        if !ids.insert(sample.id) {
            return Err(SourceError::InvalidBatch(format!(
                "sample {} repeats id {}",
                index, sample.id
            )));
        }
        if sample.location != location {
            return Err(SourceError::InvalidBatch(format!(
                "sample {} belongs to {}, requested {}",
                index, sample.location, location
            )));
        }
        if !(0.0..=1.0).contains(&sample.risk_level) {
            return Err(SourceError::InvalidBatch(format!(
                "sample {} risk level {} outside [0, 1]",
                index, sample.risk_level
            )));
        }
        if !(0.0..=1.0).contains(&sample.soil_moisture) {
            return Err(SourceError::InvalidBatch(format!(
                "sample {} soil moisture {} outside [0, 1]",
                index, sample.soil_moisture
            )));
        }
        if sample.rainfall_mm.is_nan()
            || sample.rainfall_mm < 0.0
            || !sample.temperature_c.is_finite()
        {
            return Err(SourceError::InvalidBatch(format!(
                "sample {} has invalid rainfall or temperature",
                index
            )));
        }
        if !sample.is_consistent() {
            return Err(SourceError::InvalidBatch(format!(
                "sample {} status {} disagrees with risk level {}",
                index, sample.status, sample.risk_level
            )));
        }
    }

    if let Some(index) = batch
        .windows(2)
        .position(|pair| pair[0].timestamp <= pair[1].timestamp)
    {
        return Err(SourceError::InvalidBatch(format!(
            "timestamps not strictly decreasing at sample {}",
            index + 1
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::RiskTier;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};

    fn batch(location: &str, risks: &[f64]) -> Vec<RiskSample> {
        let newest = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        risks
            .iter()
            .enumerate()
            .map(|(i, risk)| {
                RiskSample::new(
                    i as u32,
                    newest - ChronoDuration::seconds(30 * i as i64),
                    location,
                    10.0,
                    0.5,
                    22.0,
                    *risk,
                )
            })
            .collect()
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut samples = batch("PONTO-A", &[0.1, 0.4, 0.7]);
        samples[2].id = 0;

        assert_eq!(
            validate_batch(&samples, "PONTO-A", 3),
            Err(SourceError::InvalidBatch("sample 2 repeats id 0".to_string()))
        );
    }

    #[test]
    fn test_valid_batch_passes() {
        let samples = batch("PONTO-A", &[0.1, 0.4, 0.7]);
        assert!(validate_batch(&samples, "PONTO-A", 3).is_ok());
    }

    #[test]
    fn test_wrong_length_rejected() {
        let samples = batch("PONTO-A", &[0.1, 0.4]);
        let err = validate_batch(&samples, "PONTO-A", 10).unwrap_err();
        assert!(matches!(err, SourceError::InvalidBatch(_)));
    }

    #[test]
    fn test_wrong_location_rejected() {
        let samples = batch("PONTO-B", &[0.1, 0.4]);
        assert!(validate_batch(&samples, "PONTO-A", 2).is_err());
    }

    #[test]
    fn test_out_of_range_risk_rejected() {
        let mut samples = batch("PONTO-A", &[0.1, 0.4]);
        samples[1].risk_level = 1.2;
        samples[1].status = RiskTier::High;
        assert!(validate_batch(&samples, "PONTO-A", 2).is_err());
    }

    #[test]
    fn test_inconsistent_status_rejected() {
        let mut samples = batch("PONTO-A", &[0.1, 0.4]);
        samples[0].status = RiskTier::High;
        let err = validate_batch(&samples, "PONTO-A", 2).unwrap_err();
        assert!(err.to_string().contains("disagrees"));
    }

    #[test]
    fn test_non_decreasing_timestamps_rejected() {
        let mut samples = batch("PONTO-A", &[0.1, 0.4, 0.5]);
        samples[2].timestamp = samples[1].timestamp;
        let err = validate_batch(&samples, "PONTO-A", 3).unwrap_err();
        assert_eq!(
            err,
            SourceError::InvalidBatch("timestamps not strictly decreasing at sample 2".into())
        );
    }

    #[test]
    fn test_nan_rainfall_rejected() {
        let mut samples = batch("PONTO-A", &[0.1]);
        samples[0].rainfall_mm = f64::NAN;
        assert!(validate_batch(&samples, "PONTO-A", 1).is_err());
    }
}
