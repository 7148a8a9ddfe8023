//! Dashboard refresh session
//!
//! Runs a [`DashboardController`] on its own task: refreshes on a fixed
//! timer, forwards view commands, fetches batches on separate tasks and
//! publishes a new [`DashboardSnapshot`] after every state change.

use super::{DashboardController, DashboardSnapshot, RefreshKind, RefreshOutcome, RefreshTicket};
use crate::health::{components, HealthRegistry};
use crate::models::{RiskSample, BATCH_SIZE, DEFAULT_LABEL_FORMAT, DEFAULT_LOCATIONS};
use crate::observability::{DashboardMetrics, StructuredLogger};
use crate::source::{SampleSource, SourceError};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::{AbortHandle, JoinHandle, JoinSet};
use tokio::time::{interval, sleep_until, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Configuration for a dashboard session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Selectable monitoring locations
    pub locations: Vec<String>,
    /// Location shown on start-up
    pub initial_location: String,
    /// Automatic refresh period (default: 30 seconds)
    pub refresh_interval: Duration,
    /// Upper bound for a single fetch (default: 10 seconds)
    pub fetch_timeout: Duration,
    /// How long the manual refresh confirmation stays up; `None` keeps it
    /// until dismissed
    pub update_success_ttl: Option<Duration>,
    /// Samples expected per batch
    pub batch_size: usize,
    /// chrono format for chart labels
    pub label_format: String,
    /// Command channel buffer size
    pub command_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            locations: DEFAULT_LOCATIONS.iter().map(|l| l.to_string()).collect(),
            initial_location: DEFAULT_LOCATIONS[0].to_string(),
            refresh_interval: Duration::from_secs(30),
            fetch_timeout: Duration::from_secs(10),
            update_success_ttl: Some(Duration::from_secs(5)),
            batch_size: BATCH_SIZE,
            label_format: DEFAULT_LABEL_FORMAT.to_string(),
            command_buffer: 32,
        }
    }
}

/// Commands a view can send to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    SelectLocation(String),
    ForceRefresh,
    DismissError,
    DismissUpdateSuccess,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("unknown location: {0}")]
    UnknownLocation(String),
    #[error("dashboard session has stopped")]
    Closed,
}

/// View-side handle: sends commands and reads snapshots
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    snapshots: watch::Receiver<DashboardSnapshot>,
    locations: Arc<[String]>,
}

impl SessionHandle {
    /// Select a location; the session refreshes it immediately
    pub async fn select_location(&self, location: &str) -> Result<(), SessionError> {
        if !self.locations.iter().any(|known| known == location) {
            return Err(SessionError::UnknownLocation(location.to_string()));
        }
        self.send(SessionCommand::SelectLocation(location.to_string()))
            .await
    }

    /// Request a manual refresh
    pub async fn force_refresh(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::ForceRefresh).await
    }

    pub async fn dismiss_error(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::DismissError).await
    }

    pub async fn dismiss_update_success(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::DismissUpdateSuccess).await
    }

    async fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that is notified on every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.snapshots.clone()
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    /// Resolves once the session loop has stopped
    pub async fn closed(&self) {
        self.commands.closed().await
    }
}

/// Result of one fetch task
struct FetchCompletion {
    ticket: RefreshTicket,
    result: Result<Vec<RiskSample>, SourceError>,
    elapsed: Duration,
}

/// Aborts the wrapped task when dropped
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Event loop that owns the controller
pub struct SessionLoop {
    controller: DashboardController,
    source: Arc<dyn SampleSource>,
    config: SessionConfig,
    commands: mpsc::Receiver<SessionCommand>,
    snapshots: watch::Sender<DashboardSnapshot>,
    metrics: Option<DashboardMetrics>,
    health: Option<HealthRegistry>,
    logger: StructuredLogger,
}

impl SessionLoop {
    /// Run until `shutdown` fires or its sender is dropped
    ///
    /// The first timer tick is immediate, which performs the initial load.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            location = %self.controller.selected_location(),
            interval_secs = self.config.refresh_interval.as_secs(),
            "Starting dashboard refresh loop"
        );
        self.set_health(components::REFRESH_LOOP, None).await;

        let mut ticker = interval(self.config.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut fetches: JoinSet<FetchCompletion> = JoinSet::new();
        let mut success_deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let ticket = self.controller.begin_refresh();
                    self.start_fetch(&mut fetches, ticket);
                }
                Some(command) = self.commands.recv() => {
                    self.handle_command(command, &mut ticker, &mut fetches, &mut success_deadline);
                }
                Some(joined) = fetches.join_next() => {
                    match joined {
                        Ok(completion) => self.finish_fetch(completion, &mut success_deadline).await,
                        Err(e) => warn!(error = %e, "Fetch task ended without a result"),
                    }
                }
                _ = sleep_until(success_deadline.unwrap_or_else(Instant::now)), if success_deadline.is_some() => {
                    success_deadline = None;
                    self.controller.dismiss_update_success();
                    self.publish();
                }
                _ = shutdown.recv() => {
                    info!("Shutting down dashboard refresh loop");
                    break;
                }
            }
        }

        fetches.abort_all();
        self.set_health(components::REFRESH_LOOP, Some("refresh loop stopped"))
            .await;
    }

    fn handle_command(
        &mut self,
        command: SessionCommand,
        ticker: &mut Interval,
        fetches: &mut JoinSet<FetchCompletion>,
        success_deadline: &mut Option<Instant>,
    ) {
        match command {
            SessionCommand::SelectLocation(location) => {
                match self.controller.select_location(&location) {
                    Ok(ticket) => {
                        self.logger.log_location_selected(&location);
                        // next automatic refresh is one full period after the change
                        ticker.reset();
                        self.start_fetch(fetches, ticket);
                    }
                    Err(e) => warn!(error = %e, "Ignoring location change"),
                }
            }
            SessionCommand::ForceRefresh => {
                *success_deadline = None;
                let ticket = self.controller.begin_force_refresh();
                self.start_fetch(fetches, ticket);
            }
            SessionCommand::DismissError => {
                self.controller.dismiss_error();
                self.publish();
            }
            SessionCommand::DismissUpdateSuccess => {
                *success_deadline = None;
                self.controller.dismiss_update_success();
                self.publish();
            }
        }
    }

    fn start_fetch(&mut self, fetches: &mut JoinSet<FetchCompletion>, ticket: RefreshTicket) {
        debug!(
            kind = ticket.kind.as_str(),
            location = %ticket.location,
            seq = ticket.seq,
            "Refresh started"
        );
        if let Some(metrics) = &self.metrics {
            metrics.inc_refreshes(ticket.kind.as_str());
        }
        self.publish();

        fetches.spawn(fetch(
            Arc::clone(&self.source),
            ticket,
            self.config.fetch_timeout,
        ));
    }

    async fn finish_fetch(
        &mut self,
        completion: FetchCompletion,
        success_deadline: &mut Option<Instant>,
    ) {
        let FetchCompletion {
            ticket,
            result,
            elapsed,
        } = completion;
        let kind = ticket.kind.as_str();

        if let Some(metrics) = &self.metrics {
            metrics.observe_fetch_latency(elapsed.as_secs_f64());
        }

        let previous_tier = self.controller.current_tier();

        match self.controller.complete(&ticket, result) {
            RefreshOutcome::Updated => {
                let risk_level = self.controller.current_risk();
                let tier = self.controller.current_status().tier;

                self.logger
                    .log_refresh_applied(kind, &ticket.location, ticket.seq, risk_level, tier);
                if previous_tier != Some(tier) {
                    self.logger
                        .log_tier_change(&ticket.location, previous_tier, tier, risk_level);
                }
                if let Some(metrics) = &self.metrics {
                    metrics.set_current_risk(&ticket.location, risk_level);
                }
                if let Some(health) = &self.health {
                    health.set_healthy(components::SAMPLE_SOURCE).await;
                    health.set_ready(true).await;
                }
                if ticket.kind == RefreshKind::Manual {
                    *success_deadline = self
                        .config
                        .update_success_ttl
                        .map(|ttl| Instant::now() + ttl);
                }
            }
            RefreshOutcome::Failed(error) => {
                let error = error.to_string();
                self.logger
                    .log_refresh_failed(kind, &ticket.location, ticket.seq, &error);
                if let Some(metrics) = &self.metrics {
                    metrics.inc_refresh_failures(kind);
                }
                if let Some(health) = &self.health {
                    health
                        .set_degraded(components::SAMPLE_SOURCE, error)
                        .await;
                }
            }
            RefreshOutcome::Discarded => {
                self.logger
                    .log_refresh_discarded(kind, &ticket.location, ticket.seq);
                if let Some(metrics) = &self.metrics {
                    metrics.inc_stale_responses();
                }
            }
        }

        self.publish();
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.controller.snapshot());
    }

    async fn set_health(&self, component: &str, failure: Option<&str>) {
        if let Some(health) = &self.health {
            match failure {
                None => health.set_healthy(component).await,
                Some(message) => health.set_unhealthy(component, message).await,
            }
        }
    }
}

/// Fetch one batch on its own task so a panicking source cannot take the
/// loop down; the inner task is aborted if this future is dropped
async fn fetch(
    source: Arc<dyn SampleSource>,
    ticket: RefreshTicket,
    timeout: Duration,
) -> FetchCompletion {
    let started = Instant::now();
    let location = ticket.location.clone();

    let task = tokio::spawn(async move {
        tokio::time::timeout(timeout, source.fetch_batch(&location)).await
    });
    let _guard = AbortOnDrop(task.abort_handle());

    let result = match task.await {
        Ok(Ok(result)) => result,
        Ok(Err(_elapsed)) => Err(SourceError::Timeout(timeout)),
        Err(e) => Err(SourceError::Unavailable(format!("fetch task failed: {}", e))),
    };

    FetchCompletion {
        ticket,
        result,
        elapsed: started.elapsed(),
    }
}

/// Builder for a dashboard session
pub struct SessionBuilder {
    source: Option<Arc<dyn SampleSource>>,
    config: SessionConfig,
    metrics: Option<DashboardMetrics>,
    health: Option<HealthRegistry>,
    logger: Option<StructuredLogger>,
}

impl SessionBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            source: None,
            config: SessionConfig::default(),
            metrics: None,
            health: None,
            logger: None,
        }
    }

    /// Set the sample source
    pub fn source(mut self, source: Arc<dyn SampleSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn locations(mut self, locations: Vec<String>) -> Self {
        self.config.locations = locations;
        self
    }

    pub fn initial_location(mut self, location: impl Into<String>) -> Self {
        self.config.initial_location = location.into();
        self
    }

    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.config.refresh_interval = interval;
        self
    }

    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.config.fetch_timeout = timeout;
        self
    }

    pub fn update_success_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.config.update_success_ttl = ttl;
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    /// Record Prometheus metrics for this session
    pub fn metrics(mut self, metrics: DashboardMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Report source and loop health to this registry
    pub fn health(mut self, health: HealthRegistry) -> Self {
        self.health = Some(health);
        self
    }

    pub fn logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Build the session loop and its handle
    pub fn build(self) -> Result<(SessionLoop, SessionHandle)> {
        let source = self
            .source
            .ok_or_else(|| anyhow::anyhow!("Sample source is required"))?;
        let config = self.config;

        anyhow::ensure!(
            !config.refresh_interval.is_zero(),
            "Refresh interval must be greater than zero"
        );
        anyhow::ensure!(config.command_buffer > 0, "Command buffer must not be empty");

        let controller =
            DashboardController::new(config.locations.clone(), &config.initial_location)?
                .with_batch_size(config.batch_size)
                .with_label_format(config.label_format.clone());

        let (commands_tx, commands_rx) = mpsc::channel(config.command_buffer);
        let (snapshots_tx, snapshots_rx) = watch::channel(controller.snapshot());

        let handle = SessionHandle {
            commands: commands_tx,
            snapshots: snapshots_rx,
            locations: config.locations.clone().into(),
        };

        let session_loop = SessionLoop {
            controller,
            source,
            config,
            commands: commands_rx,
            snapshots: snapshots_tx,
            metrics: self.metrics,
            health: self.health,
            logger: self
                .logger
                .unwrap_or_else(|| StructuredLogger::new("landslide-dashboard")),
        };

        Ok((session_loop, handle))
    }

    /// Build and spawn the session; must be called within a Tokio runtime
    pub fn start(self) -> Result<DashboardSession> {
        DashboardSession::start(self)
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running session
///
/// The refresh timer lives as long as this value: [`shutdown`] stops it
/// gracefully and dropping it aborts the loop and any in-flight fetch.
///
/// [`shutdown`]: DashboardSession::shutdown
pub struct DashboardSession {
    handle: SessionHandle,
    shutdown: Option<broadcast::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl DashboardSession {
    /// Build and spawn a session; must be called within a Tokio runtime
    pub fn start(builder: SessionBuilder) -> Result<Self> {
        let (session_loop, handle) = builder.build()?;
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let task = tokio::spawn(session_loop.run(shutdown_rx));

        Ok(Self {
            handle,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Stop the loop and wait for it to finish
    pub async fn shutdown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Dashboard refresh loop ended abnormally");
            }
        }
    }
}

impl Drop for DashboardSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
