//! HTTP API: slot predictions, health checks and Prometheus metrics

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use parking_lib::{
    health::{ComponentStatus, HealthRegistry},
    observability::ServiceMetrics,
    weather::WeatherLookup,
    SlotsPipeline, SlotsRequest,
};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use std::time::Instant;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SlotsPipeline>,
    pub health_registry: HealthRegistry,
    pub metrics: ServiceMetrics,
}

impl AppState {
    pub fn new(pipeline: Arc<SlotsPipeline>, health_registry: HealthRegistry, metrics: ServiceMetrics) -> Self {
        Self {
            pipeline,
            health_registry,
            metrics,
        }
    }
}

/// Predict occupancy for every facility at the requested time.
///
/// Always answers 200 with a JSON array: one record per facility, or a
/// single all-zero record when the timestamp cannot be parsed.
async fn slots(State(state): State<Arc<AppState>>, Json(request): Json<SlotsRequest>) -> impl IntoResponse {
    let start = Instant::now();
    let report = state.pipeline.run(&request.date).await;

    match &report.weather {
        Some(WeatherLookup::Fallback { reason }) => {
            state.health_registry.record_weather_lookup(Some(reason.as_str())).await;
        }
        Some(WeatherLookup::Reported(_)) => {
            state.health_registry.record_weather_lookup(None).await;
        }
        None => {}
    }
    if !report.is_degraded() {
        state
            .health_registry
            .record_facility_outcomes(&report.facility_fallbacks, state.pipeline.facilities().len())
            .await;
    }

    state.metrics.observe_request_latency(start.elapsed().as_secs_f64());
    Json(report.predictions)
}

/// Health check response - returns 200 if healthy or degraded, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still answering with fallbacks
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
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
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            Vec::new(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/slots", post(slots))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
