//! Weather resolution for a requested date
//!
//! This module provides:
//! - Classification of provider condition codes into canonical categories
//! - The provider seam and a Visual Crossing implementation
//! - An optional per-date cache in front of any provider

mod cache;
mod visual_crossing;

pub use cache::{CacheConfig, CachedWeatherProvider, DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_TTL};
pub use visual_crossing::{VisualCrossingConfig, VisualCrossingProvider, DEFAULT_BASE_URL};

use crate::error::PredictionResult;
use crate::models::{GeoPoint, WeatherCategory};
use chrono::NaiveDate;

pub use async_trait::async_trait;

/// Raw code substituted whenever the provider cannot answer
pub const FALLBACK_WEATHER_CODE: &str = "clear-day";

/// Trait for weather data sources
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Raw condition code (e.g. "partly-cloudy-day") for the given date and location
    async fn daily_condition(&self, date: NaiveDate, location: GeoPoint) -> PredictionResult<String>;
}

/// Map a provider condition code onto a canonical category.
///
/// Unknown codes, including the empty string, classify as sunny.
pub fn classify(raw_code: &str) -> WeatherCategory {
    match raw_code {
        "clear-day" | "clear-night" => WeatherCategory::Sunny,
        "partly-cloudy-day" | "partly-cloudy-night" | "cloudy" | "fog" => WeatherCategory::Cloudy,
        "rain" | "thunderstorm" => WeatherCategory::Rain,
        "snow" | "snow-showers-day" | "snow-showers-night" => WeatherCategory::Snow,
        _ => WeatherCategory::Sunny,
    }
}

/// Outcome of the weather step of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeatherLookup {
    Reported(String),
    Fallback { reason: String },
}

impl WeatherLookup {
    /// Raw code to classify; the fallback resolves to "clear-day"
    pub fn raw_code(&self) -> &str {
        match self {
            WeatherLookup::Reported(code) => code,
            WeatherLookup::Fallback { .. } => FALLBACK_WEATHER_CODE,
        }
    }

    pub fn category(&self) -> WeatherCategory {
        classify(self.raw_code())
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, WeatherLookup::Fallback { .. })
    }
}
