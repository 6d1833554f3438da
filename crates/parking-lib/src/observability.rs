//! Observability infrastructure for the slot predictor
//!
//! Provides:
//! - Prometheus metrics (request, weather and inference latency; fallback counters; model info)
//! - Structured JSON logging with tracing

use prometheus::{
    register_gauge_vec, register_histogram, register_histogram_vec, register_int_counter,
    register_int_counter_vec, GaugeVec, Histogram, HistogramVec, IntCounter, IntCounterVec,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ServiceMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct ServiceMetricsInner {
    request_latency_seconds: Histogram,
    weather_latency_seconds: Histogram,
    inference_latency_seconds: HistogramVec,
    requests: IntCounter,
    malformed_requests: IntCounter,
    weather_fallbacks: IntCounter,
    facility_fallbacks: IntCounterVec,
    model_info: GaugeVec,
}

impl ServiceMetricsInner {
    fn new() -> Self {
        Self {
            request_latency_seconds: register_histogram!(
                "parking_request_latency_seconds",
                "End-to-end time spent answering a slots request",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register request_latency_seconds"),

            weather_latency_seconds: register_histogram!(
                "parking_weather_latency_seconds",
                "Time spent resolving weather for a request",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register weather_latency_seconds"),

            inference_latency_seconds: register_histogram_vec!(
                "parking_inference_latency_seconds",
                "Time spent running a facility model",
                &["facility"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register inference_latency_seconds"),

            requests: register_int_counter!(
                "parking_requests_total",
                "Total number of slots requests"
            )
            .expect("Failed to register requests_total"),

            malformed_requests: register_int_counter!(
                "parking_malformed_requests_total",
                "Requests whose timestamp could not be parsed"
            )
            .expect("Failed to register malformed_requests_total"),

            weather_fallbacks: register_int_counter!(
                "parking_weather_fallbacks_total",
                "Requests that fell back to the default weather code"
            )
            .expect("Failed to register weather_fallbacks_total"),

            facility_fallbacks: register_int_counter_vec!(
                "parking_facility_fallbacks_total",
                "Facility predictions that fell back to zero occupancy",
                &["facility"]
            )
            .expect("Failed to register facility_fallbacks_total"),

            model_info: register_gauge_vec!(
                "parking_model_info",
                "Information about the loaded facility models",
                &["facility", "sha256"]
            )
            .expect("Failed to register model_info"),
        }
    }
}

/// Service metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct ServiceMetrics {
    _private: (),
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ServiceMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_request_latency(&self, duration_secs: f64) {
        self.inner().request_latency_seconds.observe(duration_secs);
    }

    pub fn observe_weather_latency(&self, duration_secs: f64) {
        self.inner().weather_latency_seconds.observe(duration_secs);
    }

    pub fn observe_inference_latency(&self, facility: u32, duration_secs: f64) {
        self.inner()
            .inference_latency_seconds
            .with_label_values(&[&facility.to_string()])
            .observe(duration_secs);
    }

    pub fn inc_requests(&self) {
        self.inner().requests.inc();
    }

    pub fn inc_malformed_requests(&self) {
        self.inner().malformed_requests.inc();
    }

    pub fn inc_weather_fallbacks(&self) {
        self.inner().weather_fallbacks.inc();
    }

    pub fn inc_facility_fallbacks(&self, facility: u32) {
        self.inner()
            .facility_fallbacks
            .with_label_values(&[&facility.to_string()])
            .inc();
    }

    /// Record the checksum of a loaded facility model
    pub fn set_model_info(&self, facility: u32, sha256: &str) {
        self.inner()
            .model_info
            .with_label_values(&[&facility.to_string(), sha256])
            .set(1.0);
    }
}

/// Structured logger for predictor events
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Log a completed facility prediction
    pub fn log_prediction(
        &self,
        datetime: &str,
        facility: u32,
        occupied: u32,
        total_slots: u32,
        weather: &str,
    ) {
        info!(
            event = "prediction_generated",
            service = %self.service,
            datetime = %datetime,
            facility = facility,
            occupied = occupied,
            total_slots = total_slots,
            weather = %weather,
            "Generated slot prediction"
        );
    }

    pub fn log_malformed_request(&self, input: &str) {
        warn!(
            event = "malformed_timestamp",
            service = %self.service,
            input = %input,
            "Request timestamp could not be parsed, returning degraded record"
        );
    }

    pub fn log_weather_fallback(&self, date: &str, reason: &str) {
        warn!(
            event = "weather_fallback",
            service = %self.service,
            date = %date,
            reason = %reason,
            "Weather provider unavailable, using clear-day"
        );
    }

    pub fn log_facility_fallback(&self, facility: u32, reason: &str) {
        warn!(
            event = "facility_fallback",
            service = %self.service,
            facility = facility,
            reason = %reason,
            "Facility prediction failed, reporting zero occupancy"
        );
    }

    pub fn log_startup(&self, version: &str, facilities: usize) {
        info!(
            event = "service_started",
            service = %self.service,
            version = %version,
            facilities = facilities,
            "Slot predictor started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service,
            reason = %reason,
            "Slot predictor shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_metrics_creation() {
        // Metrics live in the global Prometheus registry; creating handles
        // repeatedly must reuse the same instance.
        let metrics = ServiceMetrics::new();
        let again = ServiceMetrics::new();

        metrics.observe_request_latency(0.01);
        metrics.observe_weather_latency(0.2);
        metrics.observe_inference_latency(1, 0.001);
        metrics.inc_requests();
        again.inc_malformed_requests();
        again.inc_weather_fallbacks();
        again.inc_facility_fallbacks(2);
        metrics.set_model_info(1, "abc123");
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("parking-server");
        assert_eq!(logger.service, "parking-server");
    }
}
