//! Dashboard state machine
//!
//! The controller owns everything the dashboard shows: the selected
//! location, the current batch, the chart series derived from it, the
//! loading flags and the user-facing messages. Each refresh is split into
//! `begin_*`, which hands out a [`RefreshTicket`], and [`complete`], which
//! applies the fetch result for that ticket. Fetching happens elsewhere, so
//! several requests may be in flight; a result only becomes visible if no
//! newer request has already been applied and the location is still
//! selected.
//!
//! [`complete`]: DashboardController::complete

mod session;


pub use session::{
    DashboardSession, SessionBuilder, SessionCommand, SessionConfig, SessionError, SessionHandle,
    SessionLoop,
};

use crate::classifier::{classify, Classification, RiskTier};
use crate::models::{chart_series, ChartPoint, RiskSample, BATCH_SIZE, DEFAULT_LABEL_FORMAT};
use crate::source::{validate_batch, SourceError};
use serde::Serialize;
use thiserror::Error;

/// Message shown when an automatic refresh fails
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load data. Please try again.";

/// Message shown when a manual refresh fails
pub const REFRESH_ERROR_MESSAGE: &str = "Failed to refresh data. Please try again.";

/// Message shown after a successful manual refresh
pub const UPDATE_SUCCESS_MESSAGE: &str = "New data loaded successfully!";

/// What triggered a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshKind {
    /// Timer tick, start-up or location change
    Automatic,
    /// User asked for fresh data
    Manual,
}

impl RefreshKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshKind::Automatic => "automatic",
            RefreshKind::Manual => "manual",
        }
    }
}

/// Handle for one in-flight refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTicket {
    /// Issue order; later requests carry larger numbers
    pub seq: u64,
    pub kind: RefreshKind,
    /// Location selected when the request was issued
    pub location: String,
}

/// What `complete` did with a fetch result
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The batch replaced the current one
    Updated,
    /// The fetch failed; the previous batch is still shown
    Failed(SourceError),
    /// A newer request or a location change superseded this one
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("unknown location: {0}")]
    UnknownLocation(String),
    #[error("no monitoring locations configured")]
    NoLocations,
}

/// Status panel contents
#[derive(Debug, Clone, Serialize)]
pub struct CurrentStatus {
    /// Risk of the newest sample, 0 when nothing is loaded
    pub risk_level: f64,
    pub classification: Classification,
    /// Newest sample, carrying the rainfall, moisture and temperature panel
    pub latest: Option<RiskSample>,
}

/// Read-only copy of the controller state handed to views
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub selected_location: String,
    pub batch: Vec<RiskSample>,
    pub chart_series: Vec<ChartPoint>,
    pub loading: bool,
    pub updating: bool,
    pub error: Option<String>,
    pub update_success: Option<String>,
    pub current: CurrentStatus,
}

/// Dashboard state owner
#[derive(Debug)]
pub struct DashboardController {
    locations: Vec<String>,
    selected_location: String,
    batch_size: usize,
    label_format: String,
    current_batch: Vec<RiskSample>,
    chart_series: Vec<ChartPoint>,
    automatic_in_flight: usize,
    manual_in_flight: usize,
    error: Option<String>,
    update_success: Option<String>,
    next_seq: u64,
    last_applied_seq: Option<u64>,
}

impl DashboardController {
    /// Create a controller with `initial` selected out of `locations`
    pub fn new(locations: Vec<String>, initial: &str) -> Result<Self, ControllerError> {
        if locations.is_empty() {
            return Err(ControllerError::NoLocations);
        }
        if !locations.iter().any(|location| location == initial) {
            return Err(ControllerError::UnknownLocation(initial.to_string()));
        }

        Ok(Self {
            locations,
            selected_location: initial.to_string(),
            batch_size: BATCH_SIZE,
            label_format: DEFAULT_LABEL_FORMAT.to_string(),
            current_batch: Vec::new(),
            chart_series: Vec::new(),
            automatic_in_flight: 0,
            manual_in_flight: 0,
            error: None,
            update_success: None,
            next_seq: 1,
            last_applied_seq: None,
        })
    }

    /// Set the batch length every fetch must deliver
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the chrono format used for chart labels
    pub fn with_label_format(mut self, label_format: impl Into<String>) -> Self {
        self.label_format = label_format.into();
        self
    }

    /// Switch location and begin the automatic refresh for it
    pub fn select_location(&mut self, location: &str) -> Result<RefreshTicket, ControllerError> {
        if !self.locations.iter().any(|known| known == location) {
            return Err(ControllerError::UnknownLocation(location.to_string()));
        }

        self.selected_location = location.to_string();
        Ok(self.begin_refresh())
    }

    /// Begin an automatic refresh: raises `loading` and clears the error
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.automatic_in_flight += 1;
        self.begin(RefreshKind::Automatic)
    }

    /// Begin a manual refresh: raises `updating`, clears the error and any
    /// previous success message
    pub fn begin_force_refresh(&mut self) -> RefreshTicket {
        self.manual_in_flight += 1;
        self.update_success = None;
        self.begin(RefreshKind::Manual)
    }

    fn begin(&mut self, kind: RefreshKind) -> RefreshTicket {
        self.error = None;

        let seq = self.next_seq;
        self.next_seq += 1;

        RefreshTicket {
            seq,
            kind,
            location: self.selected_location.clone(),
        }
    }

    /// Apply the result of the fetch issued for `ticket`
    pub fn complete(
        &mut self,
        ticket: &RefreshTicket,
        result: Result<Vec<RiskSample>, SourceError>,
    ) -> RefreshOutcome {
        match ticket.kind {
            RefreshKind::Automatic => {
                self.automatic_in_flight = self.automatic_in_flight.saturating_sub(1)
            }
            RefreshKind::Manual => self.manual_in_flight = self.manual_in_flight.saturating_sub(1),
        }

        if !self.accepts(ticket) {
            return RefreshOutcome::Discarded;
        }
        self.last_applied_seq = Some(ticket.seq);

        let result = result.and_then(|batch| {
            validate_batch(&batch, &ticket.location, self.batch_size)?;
            Ok(batch)
        });

        match result {
            Ok(batch) => {
                self.chart_series = chart_series(&batch, &self.label_format);
                self.current_batch = batch;
                self.error = None;
                if ticket.kind == RefreshKind::Manual {
                    self.update_success = Some(UPDATE_SUCCESS_MESSAGE.to_string());
                }
                RefreshOutcome::Updated
            }
            Err(error) => {
                let message = match ticket.kind {
                    RefreshKind::Automatic => LOAD_ERROR_MESSAGE,
                    RefreshKind::Manual => REFRESH_ERROR_MESSAGE,
                };
                self.error = Some(message.to_string());
                RefreshOutcome::Failed(error)
            }
        }
    }

    fn accepts(&self, ticket: &RefreshTicket) -> bool {
        ticket.location == self.selected_location
            && self.last_applied_seq.map_or(true, |last| ticket.seq > last)
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn dismiss_update_success(&mut self) {
        self.update_success = None;
    }

    /// Risk of the newest sample, or 0 before anything has loaded
    pub fn current_risk(&self) -> f64 {
        self.current_batch
            .first()
            .map(|sample| sample.risk_level)
            .unwrap_or(0.0)
    }

    pub fn current_status(&self) -> Classification {
        classify(self.current_risk())
    }

    /// Tier of the newest sample, `None` before anything has loaded
    pub fn current_tier(&self) -> Option<RiskTier> {
        self.current_batch.first().map(|sample| sample.status)
    }

    pub fn selected_location(&self) -> &str {
        &self.selected_location
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn current_batch(&self) -> &[RiskSample] {
        &self.current_batch
    }

    pub fn chart_series(&self) -> &[ChartPoint] {
        &self.chart_series
    }

    pub fn is_loading(&self) -> bool {
        self.automatic_in_flight > 0
    }

    pub fn is_updating(&self) -> bool {
        self.manual_in_flight > 0
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn update_success(&self) -> Option<&str> {
        self.update_success.as_deref()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            selected_location: self.selected_location.clone(),
            batch: self.current_batch.clone(),
            chart_series: self.chart_series.clone(),
            loading: self.is_loading(),
            updating: self.is_updating(),
            error: self.error.clone(),
            update_success: self.update_success.clone(),
            current: CurrentStatus {
                risk_level: self.current_risk(),
                classification: self.current_status(),
                latest: self.current_batch.first().cloned(),
            },
        }
    }
}
