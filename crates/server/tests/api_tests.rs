//! Integration tests for the server API endpoints

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use parking_lib::{
    health::{components, HealthRegistry},
    observability::ServiceMetrics,
    predictor::{FacilityPredictor, LabelEncoder, RegressionModel},
    weather::WeatherProvider,
    FacilitySpec, GeoPoint, PredictionError, PredictionResult, PredictorSettings, SlotsPipeline,
};
use parking_server::api::{create_router, AppState};
use std::sync::Arc;
use tower::ServiceExt;

struct StubProvider {
    code: Option<&'static str>,
}

#[async_trait]
impl WeatherProvider for StubProvider {
    async fn daily_condition(&self, _date: NaiveDate, _location: GeoPoint) -> PredictionResult<String> {
        self.code
            .map(str::to_string)
            .ok_or_else(|| PredictionError::WeatherProvider("status 503".to_string()))
    }
}

struct FixedModel(f32);

impl RegressionModel for FixedModel {
    fn predict(&self, _row: &[f32]) -> PredictionResult<f32> {
        Ok(self.0)
    }
}

struct BrokenModel;

impl RegressionModel for BrokenModel {
    fn predict(&self, _row: &[f32]) -> PredictionResult<f32> {
        Err(PredictionError::Inference("model raised".to_string()))
    }
}

async fn setup_test_app(
    weather: Option<&'static str>,
    model_b: Arc<dyn RegressionModel>,
) -> (Router, Arc<AppState>) {
    setup_app_with_models(weather, Arc::new(FixedModel(64.4)), model_b).await
}

async fn setup_app_with_models(
    weather: Option<&'static str>,
    model_a: Arc<dyn RegressionModel>,
    model_b: Arc<dyn RegressionModel>,
) -> (Router, Arc<AppState>) {
    let health_registry = HealthRegistry::new();
    health_registry.register(components::PREDICTOR).await;
    health_registry.register(components::WEATHER_PROVIDER).await;

    let encoder = Arc::new(LabelEncoder::from_classes(["cloudy", "rain", "snow", "sunny"]));
    let facilities = vec![
        FacilityPredictor::new(&FacilitySpec::facility_a(), model_a, encoder.clone()),
        FacilityPredictor::new(&FacilitySpec::facility_b(), model_b, encoder),
    ];
    let pipeline = SlotsPipeline::new(
        &PredictorSettings::default(),
        Arc::new(StubProvider { code: weather }),
        facilities,
    );

    let metrics = ServiceMetrics::new();
    let state = Arc::new(AppState::new(Arc::new(pipeline), health_registry, metrics));
    let router = create_router(state.clone());

    (router, state)
}

fn slots_request(date: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/slots")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::json!({ "date": date }).to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_slots_returns_both_facilities() {
    let (app, _state) = setup_test_app(Some("rain"), Arc::new(FixedModel(12.2))).await;

    let response = app.oneshot(slots_request("2026-01-01 09:30")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 2);

    assert_eq!(records[0]["id"], 1);
    assert_eq!(records[0]["datetime"], "2026-01-01 09:30");
    assert_eq!(records[0]["total_slots"], 120);
    assert_eq!(records[0]["total_occupied"], 64);
    assert_eq!(records[0]["total_empty"], 56);

    assert_eq!(records[1]["id"], 2);
    assert_eq!(records[1]["total_slots"], 30);
    assert_eq!(records[1]["total_occupied"], 12);
    assert_eq!(records[1]["total_empty"], 18);
}

#[tokio::test]
async fn test_slots_malformed_date_returns_single_zero_record() {
    let (app, _state) = setup_test_app(Some("rain"), Arc::new(FixedModel(12.2))).await;

    let response = app.oneshot(slots_request("not-a-date")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].get("id").is_none());
    assert_eq!(records[0]["datetime"], "not-a-date");
    assert_eq!(records[0]["total_slots"], 0);
    assert_eq!(records[0]["total_occupied"], 0);
    assert_eq!(records[0]["total_empty"], 0);
}

#[tokio::test]
async fn test_slots_loosely_spaced_dates_are_malformed() {
    for raw in ["2026-01-0110:00", " 2026-01-01 10:00", "+2026-01-01 10:00"] {
        let (app, _state) = setup_test_app(Some("rain"), Arc::new(FixedModel(12.2))).await;

        let response = app.oneshot(slots_request(raw)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let records = body.as_array().unwrap();
        assert_eq!(records.len(), 1, "input {:?}", raw);
        assert!(records[0].get("id").is_none());
        assert_eq!(records[0]["datetime"], raw);
        assert_eq!(records[0]["total_slots"], 0);
    }
}

#[tokio::test]
async fn test_slots_isolates_facility_failure() {
    let (app, _state) = setup_test_app(Some("clear-day"), Arc::new(BrokenModel)).await;

    let response = app.oneshot(slots_request("2026-05-12 08:00")).await.unwrap();
    let body = body_json(response).await;

    assert_eq!(body[0]["total_occupied"], 64);
    assert_eq!(body[1]["id"], 2);
    assert_eq!(body[1]["total_slots"], 30);
    assert_eq!(body[1]["total_occupied"], 0);
    assert_eq!(body[1]["total_empty"], 30);
}

#[tokio::test]
async fn test_weather_fallback_degrades_health_but_still_answers() {
    let (app, state) = setup_test_app(None, Arc::new(FixedModel(12.2))).await;

    let response = app
        .clone()
        .oneshot(slots_request("2026-05-12 08:00"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

    let health = state.health_registry.health().await;
    assert_eq!(
        health.components[components::WEATHER_PROVIDER].consecutive_failures,
        1
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Degraded still returns 200
    assert_eq!(response.status(), StatusCode::OK);
    let health = body_json(response).await;
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["components"]["weather_provider"]["status"], "degraded");
}

#[tokio::test]
async fn test_slots_rejects_body_without_date() {
    let (app, _state) = setup_test_app(Some("rain"), Arc::new(FixedModel(1.0))).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/slots")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"when": "2026-01-01 09:30"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_healthz_returns_ok_when_healthy() {
    let (app, _state) = setup_test_app(Some("rain"), Arc::new(FixedModel(1.0))).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let health = body_json(response).await;
    assert_eq!(health["status"], "healthy");
    assert!(health["components"]["predictor"].is_object());
    assert!(health["components"]["weather_provider"].is_object());
}

#[tokio::test]
async fn test_healthz_returns_503_when_every_facility_falls_back() {
    let (app, state) =
        setup_app_with_models(Some("rain"), Arc::new(BrokenModel), Arc::new(BrokenModel)).await;
    state.health_registry.set_ready(true).await;

    let response = app
        .clone()
        .oneshot(slots_request("2026-05-12 08:00"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body[0]["total_empty"], 120);
    assert_eq!(body[1]["total_empty"], 30);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let health = body_json(response).await;
    assert_eq!(health["status"], "unhealthy");
    assert_eq!(health["components"]["predictor"]["message"], "facility 1, 2 fell back");

    // Still in rotation so a recovered model can be observed
    let response = app
        .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_single_facility_failure_degrades_predictor() {
    let (app, state) = setup_test_app(Some("rain"), Arc::new(BrokenModel)).await;

    app.oneshot(slots_request("2026-05-12 08:00")).await.unwrap();

    let health = state.health_registry.health().await;
    assert_eq!(health.status, parking_lib::ComponentStatus::Degraded);
    assert_eq!(
        health.components[components::PREDICTOR].message.as_deref(),
        Some("facility 2 fell back")
    );
}

#[tokio::test]
async fn test_readyz_follows_ready_flag() {
    let (app, state) = setup_test_app(Some("rain"), Arc::new(FixedModel(1.0))).await;

    // Not ready until artifacts are marked loaded
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["ready"], false);

    state.health_registry.set_ready(true).await;

    let response = app
        .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["ready"], true);
}

#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_format() {
    let (app, state) = setup_test_app(Some("rain"), Arc::new(FixedModel(1.0))).await;

    // Drive one request through so counters and histograms have samples
    app.clone()
        .oneshot(slots_request("2026-01-01 09:30"))
        .await
        .unwrap();
    state.metrics.set_model_info(1, "deadbeef");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let metrics_text = String::from_utf8(body.to_vec()).unwrap();

    assert!(metrics_text.contains("parking_requests_total"));
    assert!(metrics_text.contains("parking_request_latency_seconds_bucket"));
    assert!(metrics_text.contains("parking_inference_latency_seconds"));
    assert!(metrics_text.contains("parking_model_info"));
}

#[tokio::test]
async fn test_cors_preflight_allowed() {
    let (app, _state) = setup_test_app(Some("rain"), Arc::new(FixedModel(1.0))).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/slots")
                .header("origin", "http://frontend.example")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
}
