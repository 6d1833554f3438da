//! Feature extraction for ML inference
//!
//! Turns the requested timestamp into the calendar features shared by both
//! facility models, and lays those features out in a model's column order.

use crate::error::{PredictionError, PredictionResult};
use crate::models::CalendarFeatures;
use crate::settings::Calendar;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Accepted request timestamp format (minute precision, no offset)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Date format used for weather lookups and calendar matching
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One model input column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureColumn {
    Weekday,
    Hour,
    Minute,
    IsWeekend,
    WeatherEncoded,
    HolidayFlag,
    SpecialEventFlag,
}

impl FeatureColumn {
    pub const FACILITY_A_ORDER: [FeatureColumn; 7] = [
        FeatureColumn::Weekday,
        FeatureColumn::Hour,
        FeatureColumn::Minute,
        FeatureColumn::IsWeekend,
        FeatureColumn::WeatherEncoded,
        FeatureColumn::HolidayFlag,
        FeatureColumn::SpecialEventFlag,
    ];

    pub const FACILITY_B_ORDER: [FeatureColumn; 7] = [
        FeatureColumn::Weekday,
        FeatureColumn::Hour,
        FeatureColumn::Minute,
        FeatureColumn::IsWeekend,
        FeatureColumn::HolidayFlag,
        FeatureColumn::SpecialEventFlag,
        FeatureColumn::WeatherEncoded,
    ];

    fn value(&self, features: &CalendarFeatures, weather_encoded: i64) -> f32 {
        match self {
            FeatureColumn::Weekday => features.weekday as f32,
            FeatureColumn::Hour => features.hour as f32,
            FeatureColumn::Minute => features.minute as f32,
            FeatureColumn::IsWeekend => features.is_weekend as f32,
            FeatureColumn::WeatherEncoded => weather_encoded as f32,
            FeatureColumn::HolidayFlag => features.holiday_flag as f32,
            FeatureColumn::SpecialEventFlag => features.special_event_flag as f32,
        }
    }
}

/// Build a single feature row in the given column order
pub fn assemble_row(
    columns: &[FeatureColumn],
    features: &CalendarFeatures,
    weather_encoded: i64,
) -> Vec<f32> {
    columns
        .iter()
        .map(|column| column.value(features, weather_encoded))
        .collect()
}

/// Parse a request timestamp.
///
/// chrono's parser tolerates missing or repeated spaces, leading whitespace
/// and a signed year, so the shape is checked first: a date and a time
/// separated by exactly one space, each made of digits and its separator.
pub fn parse_timestamp(raw: &str) -> PredictionResult<NaiveDateTime> {
    let malformed = || PredictionError::MalformedTimestamp {
        input: raw.to_string(),
    };

    let (date, time) = raw.split_once(' ').ok_or_else(malformed)?;
    let well_formed = |part: &str, separator: char| {
        !part.is_empty()
            && part.starts_with(|c: char| c.is_ascii_digit())
            && part.chars().all(|c| c.is_ascii_digit() || c == separator)
    };
    if !well_formed(date, '-') || !well_formed(time, ':') {
        return Err(malformed());
    }

    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|_| malformed())
}

/// Derives calendar features against a fixed holiday/event calendar
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    calendar: Calendar,
}

impl FeatureExtractor {
    pub fn new(calendar: Calendar) -> Self {
        Self { calendar }
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn extract(&self, timestamp: &NaiveDateTime) -> CalendarFeatures {
        let weekday = timestamp.weekday().num_days_from_monday() + 1;
        let date: NaiveDate = timestamp.date();

        CalendarFeatures {
            weekday,
            hour: timestamp.hour(),
            minute: timestamp.minute(),
            is_weekend: u8::from(weekday == 6 || weekday == 7),
            holiday_flag: u8::from(self.calendar.is_holiday(date)),
            special_event_flag: u8::from(self.calendar.is_special_event(date)),
        }
    }

    /// Parse and extract in one step
    pub fn derive(&self, raw: &str) -> PredictionResult<CalendarFeatures> {
        parse_timestamp(raw).map(|ts| self.extract(&ts))
    }
}
