//! Request pipeline
//!
//! Parses the requested timestamp, resolves weather for its date, and runs
//! every facility. Each request is independent; failures are contained at
//! three points (timestamp, weather, facility) and reported in the
//! [`SlotsReport`] instead of being returned as errors.

use crate::models::{GeoPoint, SlotsPrediction};
use crate::observability::{ServiceMetrics, StructuredLogger};
use crate::predictor::{parse_timestamp, FacilityOutcome, FacilityPredictor, FeatureExtractor, DATE_FORMAT};
use crate::settings::PredictorSettings;
use crate::weather::{WeatherLookup, WeatherProvider};
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Everything a request produced, including which fallbacks fired
#[derive(Debug, Clone)]
pub struct SlotsReport {
    pub predictions: Vec<SlotsPrediction>,
    /// `None` when the timestamp was malformed and weather was never queried
    pub weather: Option<WeatherLookup>,
    /// Ids of facilities that reported the zero-occupancy fallback
    pub facility_fallbacks: Vec<u32>,
}

impl SlotsReport {
    pub fn is_degraded(&self) -> bool {
        self.weather.is_none()
    }
}

pub struct SlotsPipeline {
    extractor: FeatureExtractor,
    location: GeoPoint,
    weather_timeout: Duration,
    weather: Arc<dyn WeatherProvider>,
    facilities: Vec<FacilityPredictor>,
    metrics: ServiceMetrics,
    logger: StructuredLogger,
}

impl SlotsPipeline {
    /// Facilities are answered in ascending id order regardless of input order
    pub fn new(
        settings: &PredictorSettings,
        weather: Arc<dyn WeatherProvider>,
        mut facilities: Vec<FacilityPredictor>,
    ) -> Self {
        facilities.sort_by_key(|f| f.id());
        Self {
            extractor: FeatureExtractor::new(settings.calendar.clone()),
            location: settings.location,
            weather_timeout: settings.weather_timeout,
            weather,
            facilities,
            metrics: ServiceMetrics::new(),
            logger: StructuredLogger::new("parking-pipeline"),
        }
    }

    pub fn facilities(&self) -> &[FacilityPredictor] {
        &self.facilities
    }

    /// Look up the raw weather code for `date`, bounded by the configured timeout
    pub async fn resolve_weather(&self, date: NaiveDate) -> WeatherLookup {
        let start = Instant::now();
        let result = tokio::time::timeout(
            self.weather_timeout,
            self.weather.daily_condition(date, self.location),
        )
        .await;
        self.metrics
            .observe_weather_latency(start.elapsed().as_secs_f64());

        match result {
            Ok(Ok(code)) => WeatherLookup::Reported(code),
            Ok(Err(e)) => WeatherLookup::Fallback {
                reason: e.to_string(),
            },
            Err(_) => WeatherLookup::Fallback {
                reason: format!("lookup exceeded {}ms", self.weather_timeout.as_millis()),
            },
        }
    }

    /// Run the full pipeline for one raw `YYYY-MM-DD HH:MM` string
    pub async fn run(&self, raw: &str) -> SlotsReport {
        self.metrics.inc_requests();

        let timestamp = match parse_timestamp(raw) {
            Ok(ts) => ts,
            Err(_) => {
                self.metrics.inc_malformed_requests();
                self.logger.log_malformed_request(raw);
                return SlotsReport {
                    predictions: vec![SlotsPrediction::degraded(raw)],
                    weather: None,
                    facility_fallbacks: Vec::new(),
                };
            }
        };

        let date = timestamp.date();
        let date_str = date.format(DATE_FORMAT).to_string();

        let weather = self.resolve_weather(date).await;
        if let WeatherLookup::Fallback { reason } = &weather {
            self.metrics.inc_weather_fallbacks();
            self.logger.log_weather_fallback(&date_str, reason);
        }
        let category = weather.category();
        debug!(date = %date_str, raw_code = %weather.raw_code(), category = %category, "Resolved weather");

        let features = self.extractor.extract(&timestamp);

        let mut predictions = Vec::with_capacity(self.facilities.len());
        let mut facility_fallbacks = Vec::new();

        for facility in &self.facilities {
            let start = Instant::now();
            let outcome = facility.estimate(&features, category);
            self.metrics
                .observe_inference_latency(facility.id(), start.elapsed().as_secs_f64());

            match &outcome {
                FacilityOutcome::Estimated { occupied, .. } => {
                    self.logger.log_prediction(
                        raw,
                        facility.id(),
                        *occupied,
                        facility.total_slots(),
                        category.as_str(),
                    );
                }
                FacilityOutcome::Fallback { error, .. } => {
                    self.metrics.inc_facility_fallbacks(facility.id());
                    self.logger
                        .log_facility_fallback(facility.id(), &error.to_string());
                    facility_fallbacks.push(facility.id());
                }
            }

            predictions.push(facility.to_record(raw, &outcome));
        }

        SlotsReport {
            predictions,
            weather: Some(weather),
            facility_fallbacks,
        }
    }

    /// Ordered per-facility predictions for `raw`
    pub async fn get_slots(&self, raw: &str) -> Vec<SlotsPrediction> {
        self.run(raw).await.predictions
    }
}
