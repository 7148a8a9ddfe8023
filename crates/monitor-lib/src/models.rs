//! Core data models for the landslide monitor

use crate::classifier::{classify, RiskTier};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Monitoring points shown when no location list is configured
pub const DEFAULT_LOCATIONS: &[&str] = &["PONTO-A", "PONTO-B"];

/// Number of samples in one batch
pub const BATCH_SIZE: usize = 10;

/// Nominal spacing between consecutive samples of a batch
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(30);

/// Chart label layout: day/month/year hour:minute in local time
pub const DEFAULT_LABEL_FORMAT: &str = "%d/%m/%Y %H:%M";

/// One telemetry reading for a monitoring location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSample {
    /// Position within the batch, 0 is the newest reading
    pub id: u32,
    pub timestamp: DateTime<Utc>,
    pub location: String,
    pub rainfall_mm: f64,
    /// Fraction of water in the soil, 0..=1
    pub soil_moisture: f64,
    pub temperature_c: f64,
    /// Estimated landslide probability, 0..=1
    pub risk_level: f64,
    /// Tier of `risk_level`, always produced by [`classify`]
    pub status: RiskTier,
}

impl RiskSample {
    /// Build a sample, deriving `status` from `risk_level`
    pub fn new(
        id: u32,
        timestamp: DateTime<Utc>,
        location: impl Into<String>,
        rainfall_mm: f64,
        soil_moisture: f64,
        temperature_c: f64,
        risk_level: f64,
    ) -> Self {
        Self {
            id,
            timestamp,
            location: location.into(),
            rainfall_mm,
            soil_moisture,
            temperature_c,
            risk_level,
            status: classify(risk_level).tier,
        }
    }

    /// Whether the stored status still agrees with the classifier
    pub fn is_consistent(&self) -> bool {
        self.status == classify(self.risk_level).tier
    }
}

/// One point of the risk history chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub risk_level: f64,
}

impl ChartPoint {
    /// Chart point for a sample, labelled with its local timestamp
    pub fn from_sample(sample: &RiskSample, label_format: &str) -> Self {
        Self {
            label: sample
                .timestamp
                .with_timezone(&Local)
                .format(label_format)
                .to_string(),
            risk_level: sample.risk_level,
        }
    }
}

/// Derive the chart series for a batch, preserving batch order
pub fn chart_series(batch: &[RiskSample], label_format: &str) -> Vec<ChartPoint> {
    batch
        .iter()
        .map(|sample| ChartPoint::from_sample(sample, label_format))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sample_status_derived_from_risk() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let sample = RiskSample::new(0, ts, "PONTO-A", 12.5, 0.4, 22.0, 0.45);

        assert_eq!(sample.status, RiskTier::Moderate);
        assert!(sample.is_consistent());
    }

    #[test]
    fn test_tampered_status_is_inconsistent() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut sample = RiskSample::new(0, ts, "PONTO-A", 12.5, 0.4, 22.0, 0.9);
        sample.status = RiskTier::Low;

        assert!(!sample.is_consistent());
    }

    #[test]
    fn test_chart_series_keeps_batch_order() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let batch: Vec<RiskSample> = [0.9, 0.1, 0.5]
            .iter()
            .enumerate()
            .map(|(i, risk)| {
                RiskSample::new(
                    i as u32,
                    ts - chrono::Duration::seconds(30 * i as i64),
                    "PONTO-A",
                    0.0,
                    0.5,
                    21.0,
                    *risk,
                )
            })
            .collect();

        let series = chart_series(&batch, DEFAULT_LABEL_FORMAT);

        assert_eq!(series.len(), 3);
        assert_eq!(series[0].risk_level, 0.9);
        assert_eq!(series[2].risk_level, 0.5);
        let expected = ts.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string();
        assert_eq!(series[0].label, expected);
    }

    #[test]
    fn test_sample_serializes_status_lowercase() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let sample = RiskSample::new(3, ts, "PONTO-B", 40.0, 0.8, 25.0, 0.7);
        let json = serde_json::to_value(&sample).unwrap();

        assert_eq!(json["status"], "high");
        assert_eq!(json["location"], "PONTO-B");
        assert_eq!(json["id"], 3);
    }
}
