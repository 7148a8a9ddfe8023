//! HTTP view of the dashboard, plus health checks and Prometheus metrics

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use monitor_lib::{
    classify, controller::SessionError, health::ComponentStatus, Classification,
    DashboardMetrics, HealthRegistry, SessionHandle,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub health_registry: HealthRegistry,
    pub metrics: DashboardMetrics,
    pub session: SessionHandle,
}

impl AppState {
    pub fn new(
        health_registry: HealthRegistry,
        metrics: DashboardMetrics,
        session: SessionHandle,
    ) -> Self {
        Self {
            health_registry,
            metrics,
            session,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

fn session_error_response(e: SessionError) -> Response {
    match e {
        SessionError::UnknownLocation(_) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
        SessionError::Closed => error_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
    }
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        // last good batch is still being served
        ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 once the first batch is loaded
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to encode metrics");
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

async fn dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.session.snapshot())
}

async fn force_refresh(State(state): State<Arc<AppState>>) -> Response {
    match state.session.force_refresh().await {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(e) => session_error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    pub location: String,
}

async fn select_location(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LocationRequest>,
) -> Response {
    match state.session.select_location(&request.location).await {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(e) => session_error_response(e),
    }
}

async fn dismiss_error(State(state): State<Arc<AppState>>) -> Response {
    match state.session.dismiss_error().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => session_error_response(e),
    }
}

async fn dismiss_update_success(State(state): State<Arc<AppState>>) -> Response {
    match state.session.dismiss_update_success().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => session_error_response(e),
    }
}

#[derive(Debug, Serialize)]
struct LocationsResponse<'a> {
    locations: &'a [String],
    selected: String,
}

async fn locations(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let selected = state.session.snapshot().selected_location;
    Json(LocationsResponse {
        locations: state.session.locations(),
        selected,
    })
    .into_response()
}

#[derive(Debug, Deserialize)]
pub struct ClassifyQuery {
    pub risk: f64,
}

#[derive(Debug, Serialize)]
struct ClassifyResponse {
    risk_level: f64,
    #[serde(flatten)]
    classification: Classification,
}

async fn classify_risk(Query(query): Query<ClassifyQuery>) -> impl IntoResponse {
    Json(ClassifyResponse {
        risk_level: query.risk,
        classification: classify(query.risk),
    })
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/dashboard", get(dashboard))
        .route("/api/dashboard/error", delete(dismiss_error))
        .route(
            "/api/dashboard/update-success",
            delete(dismiss_update_success),
        )
        .route("/api/refresh", post(force_refresh))
        .route("/api/location", put(select_location))
        .route("/api/locations", get(locations))
        .route("/api/classify", get(classify_risk))
        .with_state(state)
}

/// Start the API server; returns once `shutdown` resolves
pub async fn serve(
    bind_address: &str,
    port: u16,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("{}:{}", bind_address, port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
