//! Process-wide static configuration
//!
//! Built once at startup and shared by reference; nothing here changes while
//! requests are being served.

use crate::models::GeoPoint;
use crate::predictor::FeatureColumn;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Default bound on a single weather provider call
pub const DEFAULT_WEATHER_TIMEOUT: Duration = Duration::from_secs(5);

/// Holiday and special-event dates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    pub holidays: BTreeSet<NaiveDate>,
    pub special_events: BTreeSet<NaiveDate>,
}

impl Calendar {
    pub fn new(
        holidays: impl IntoIterator<Item = NaiveDate>,
        special_events: impl IntoIterator<Item = NaiveDate>,
    ) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
            special_events: special_events.into_iter().collect(),
        }
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn is_special_event(&self, date: NaiveDate) -> bool {
        self.special_events.contains(&date)
    }

    /// The calendar the production models were trained against
    pub fn standard() -> Self {
        Self::new(
            [(2026, 1, 1), (2026, 11, 8), (2026, 11, 9), (2026, 12, 25)]
                .into_iter()
                .filter_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            NaiveDate::from_ymd_opt(2026, 3, 20),
        )
    }
}

/// Static description of one parking facility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilitySpec {
    pub id: u32,
    pub name: String,
    pub total_slots: u32,
    /// Column order the facility's model was trained with
    pub columns: Vec<FeatureColumn>,
    /// Model file name, relative to the model directory
    pub model_file: String,
    /// Encoder vocabulary file name, relative to the model directory
    pub encoder_file: String,
    /// Expected hex SHA-256 of the model file
    #[serde(default)]
    pub model_sha256: Option<String>,
}

impl FacilitySpec {
    /// Facility A: 120 slots
    pub fn facility_a() -> Self {
        Self {
            id: 1,
            name: "A".to_string(),
            total_slots: 120,
            columns: FeatureColumn::FACILITY_A_ORDER.to_vec(),
            model_file: "parking_predictor.onnx".to_string(),
            encoder_file: "weather_encoder.json".to_string(),
            model_sha256: None,
        }
    }

    /// Facility B: 30 slots, weather column last
    pub fn facility_b() -> Self {
        Self {
            id: 2,
            name: "B".to_string(),
            total_slots: 30,
            columns: FeatureColumn::FACILITY_B_ORDER.to_vec(),
            model_file: "parking_b_model.onnx".to_string(),
            encoder_file: "parking_b_weather_encoder.json".to_string(),
            model_sha256: None,
        }
    }
}

/// Immutable settings handed to the pipeline
#[derive(Debug, Clone)]
pub struct PredictorSettings {
    pub calendar: Calendar,
    pub location: GeoPoint,
    pub weather_timeout: Duration,
    pub facilities: Vec<FacilitySpec>,
}

impl Default for PredictorSettings {
    fn default() -> Self {
        Self {
            calendar: Calendar::standard(),
            location: GeoPoint {
                latitude: 40.3766,
                longitude: 49.8516,
            },
            weather_timeout: DEFAULT_WEATHER_TIMEOUT,
            facilities: vec![FacilitySpec::facility_a(), FacilitySpec::facility_b()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_standard_calendar() {
        let calendar = Calendar::standard();
        assert_eq!(calendar.holidays.len(), 4);
        assert!(calendar.is_holiday(date("2026-11-09")));
        assert!(!calendar.is_holiday(date("2026-12-24")));
        assert!(calendar.is_special_event(date("2026-03-20")));
        assert!(!calendar.is_special_event(date("2026-03-21")));
    }

    #[test]
    fn test_calendar_deserializes_from_date_strings() {
        let calendar: Calendar = serde_json::from_str(
            r#"{"holidays": ["2027-01-01"], "special_events": []}"#,
        )
        .unwrap();
        assert!(calendar.is_holiday(date("2027-01-01")));
        assert!(calendar.special_events.is_empty());
    }

    #[test]
    fn test_default_facilities() {
        let settings = PredictorSettings::default();
        let ids: Vec<u32> = settings.facilities.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(settings.facilities[0].total_slots, 120);
        assert_eq!(settings.facilities[1].total_slots, 30);
        assert_ne!(settings.facilities[0].columns, settings.facilities[1].columns);
        assert_eq!(settings.weather_timeout, DEFAULT_WEATHER_TIMEOUT);
    }
}
