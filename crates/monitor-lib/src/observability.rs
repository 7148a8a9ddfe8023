//! Observability infrastructure for the dashboard
//!
//! Provides:
//! - Prometheus metrics (refresh counts, fetch latency, current risk per location)
//! - Structured JSON logging with tracing

use crate::classifier::RiskTier;
use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_counter_vec,
    GaugeVec, Histogram, IntCounter, IntCounterVec,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for sample fetch latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<DashboardMetricsInner> = OnceLock::new();

struct DashboardMetricsInner {
    refreshes: IntCounterVec,
    refresh_failures: IntCounterVec,
    stale_responses: IntCounter,
    fetch_latency_seconds: Histogram,
    current_risk_level: GaugeVec,
}

impl DashboardMetricsInner {
    fn new() -> Self {
        Self {
            refreshes: register_int_counter_vec!(
                "landslide_dashboard_refreshes_total",
                "Refreshes started, by trigger kind",
                &["kind"]
            )
            .expect("Failed to register refreshes_total"),

            refresh_failures: register_int_counter_vec!(
                "landslide_dashboard_refresh_failures_total",
                "Refreshes that ended with a sample source error, by trigger kind",
                &["kind"]
            )
            .expect("Failed to register refresh_failures_total"),

            stale_responses: register_int_counter!(
                "landslide_dashboard_stale_responses_total",
                "Fetch results discarded because a newer request superseded them"
            )
            .expect("Failed to register stale_responses_total"),

            fetch_latency_seconds: register_histogram!(
                "landslide_dashboard_fetch_latency_seconds",
                "Time spent fetching a sample batch",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register fetch_latency_seconds"),

            current_risk_level: register_gauge_vec!(
                "landslide_dashboard_current_risk_level",
                "Risk level of the newest sample shown for a location",
                &["location"]
            )
            .expect("Failed to register current_risk_level"),
        }
    }
}

/// Dashboard metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share the
/// same underlying metrics.
#[derive(Clone)]
pub struct DashboardMetrics {
    _private: (),
}

impl Default for DashboardMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardMetrics {
    /// Create a new metrics handle (registers global metrics on first call)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(DashboardMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &DashboardMetricsInner {
        GLOBAL_METRICS.get_or_init(DashboardMetricsInner::new)
    }

    pub fn inc_refreshes(&self, kind: &str) {
        self.inner().refreshes.with_label_values(&[kind]).inc();
    }

    pub fn inc_refresh_failures(&self, kind: &str) {
        self.inner().refresh_failures.with_label_values(&[kind]).inc();
    }

    pub fn inc_stale_responses(&self) {
        self.inner().stale_responses.inc();
    }

    pub fn observe_fetch_latency(&self, duration_secs: f64) {
        self.inner().fetch_latency_seconds.observe(duration_secs);
    }

    pub fn set_current_risk(&self, location: &str, risk_level: f64) {
        self.inner()
            .current_risk_level
            .with_label_values(&[location])
            .set(risk_level);
    }

    pub fn refreshes(&self, kind: &str) -> u64 {
        self.inner().refreshes.with_label_values(&[kind]).get()
    }

    pub fn refresh_failures(&self, kind: &str) -> u64 {
        self.inner().refresh_failures.with_label_values(&[kind]).get()
    }
}

/// Structured logger for dashboard events
///
/// Every event carries an `event` field and the dashboard instance name so
/// JSON logs can be filtered without parsing messages.
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn log_startup(&self, version: &str, location: &str, refresh_interval_secs: u64) {
        info!(
            event = "dashboard_started",
            instance = %self.instance,
            version = %version,
            location = %location,
            refresh_interval_secs = refresh_interval_secs,
            "Landslide dashboard started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "dashboard_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Landslide dashboard shutting down"
        );
    }

    pub fn log_location_selected(&self, location: &str) {
        info!(
            event = "location_selected",
            instance = %self.instance,
            location = %location,
            "Monitoring location selected"
        );
    }

    pub fn log_refresh_applied(
        &self,
        kind: &str,
        location: &str,
        seq: u64,
        risk_level: f64,
        tier: RiskTier,
    ) {
        info!(
            event = "refresh_applied",
            instance = %self.instance,
            kind = %kind,
            location = %location,
            seq = seq,
            risk_level = risk_level,
            tier = %tier.as_str(),
            "Dashboard refreshed"
        );
    }

    pub fn log_refresh_failed(&self, kind: &str, location: &str, seq: u64, error: &str) {
        warn!(
            event = "refresh_failed",
            instance = %self.instance,
            kind = %kind,
            location = %location,
            seq = seq,
            error = %error,
            "Sample source failed, keeping previous batch"
        );
    }

    pub fn log_refresh_discarded(&self, kind: &str, location: &str, seq: u64) {
        info!(
            event = "refresh_discarded",
            instance = %self.instance,
            kind = %kind,
            location = %location,
            seq = seq,
            "Discarded superseded fetch result"
        );
    }

    /// Log a change of the current risk tier; entering High is a warning
    pub fn log_tier_change(
        &self,
        location: &str,
        previous: Option<RiskTier>,
        current: RiskTier,
        risk_level: f64,
    ) {
        let previous = previous.map(|tier| tier.as_str()).unwrap_or("none");

        if current == RiskTier::High {
            warn!(
                event = "risk_tier_changed",
                instance = %self.instance,
                location = %location,
                previous = %previous,
                current = %current.as_str(),
                risk_level = risk_level,
                "High landslide risk"
            );
        } else {
            info!(
                event = "risk_tier_changed",
                instance = %self.instance,
                location = %location,
                previous = %previous,
                current = %current.as_str(),
                risk_level = risk_level,
                "Risk tier changed"
            );
        }
    }
}
