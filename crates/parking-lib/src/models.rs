//! Core data models for the slot predictor

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical weather category consumed by the facility models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCategory {
    #[default]
    Sunny,
    Cloudy,
    Rain,
    Snow,
}

impl WeatherCategory {
    pub const ALL: [WeatherCategory; 4] = [
        WeatherCategory::Sunny,
        WeatherCategory::Cloudy,
        WeatherCategory::Rain,
        WeatherCategory::Snow,
    ];

    /// Label used by the trained encoders
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCategory::Sunny => "sunny",
            WeatherCategory::Cloudy => "cloudy",
            WeatherCategory::Rain => "rain",
            WeatherCategory::Snow => "snow",
        }
    }
}

impl fmt::Display for WeatherCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar-derived features shared by both facilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFeatures {
    /// 1 = Monday ... 7 = Sunday
    pub weekday: u32,
    pub hour: u32,
    pub minute: u32,
    pub is_weekend: u8,
    pub holiday_flag: u8,
    pub special_event_flag: u8,
}

/// Per-facility prediction record returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotsPrediction {
    /// Facility id, absent on the degraded record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub datetime: String,
    pub total_slots: u32,
    pub total_occupied: u32,
    pub total_empty: u32,
}

impl SlotsPrediction {
    /// All-zero record returned when the requested timestamp cannot be parsed
    pub fn degraded(datetime: impl Into<String>) -> Self {
        Self {
            id: None,
            datetime: datetime.into(),
            total_slots: 0,
            total_occupied: 0,
            total_empty: 0,
        }
    }
}

/// Inbound request body for the slots endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotsRequest {
    /// "YYYY-MM-DD HH:MM"
    pub date: String,
}

/// Fixed geographic point used for weather lookups
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}
