//! Core library for the landslide risk monitor
//!
//! This crate provides the core functionality for:
//! - Risk sample data model and batch contract
//! - Risk classification (tier, color, icon, recommendations)
//! - Sample sources (synthetic generator behind a pluggable trait)
//! - Dashboard controller state machine and refresh session
//! - Health checks and observability

pub mod classifier;
pub mod controller;
pub mod health;
pub mod models;
pub mod observability;
pub mod source;

pub use classifier::{classify, Classification, Recommendation, RiskTier, StatusIcon};
pub use controller::{
    CurrentStatus, DashboardController, DashboardSession, DashboardSnapshot, SessionBuilder,
    SessionConfig, SessionHandle,
};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{DashboardMetrics, StructuredLogger};
pub use source::{SampleSource, SourceError, SyntheticSource};
