//! Server configuration

use anyhow::{Context, Result};
use chrono::NaiveDate;
use parking_lib::weather::{
    CacheConfig, VisualCrossingConfig, DEFAULT_BASE_URL, DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_TTL,
};
use parking_lib::{Calendar, FacilitySpec, GeoPoint, PredictorSettings};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// HTTP port for the slots API, health and metrics
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Directory holding the facility model and encoder artifacts
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    /// Visual Crossing timeline endpoint
    #[serde(default = "default_weather_base_url")]
    pub weather_base_url: String,

    #[serde(default)]
    pub weather_api_key: String,

    /// Upper bound on a single weather lookup
    #[serde(default = "default_weather_timeout")]
    pub weather_timeout_secs: u64,

    /// Cache successful weather lookups per date
    #[serde(default = "default_weather_cache")]
    pub weather_cache: bool,

    /// Seconds a cached weather answer stays valid
    #[serde(default = "default_weather_cache_ttl")]
    pub weather_cache_ttl_secs: u64,

    #[serde(default = "default_weather_cache_max_entries")]
    pub weather_cache_max_entries: usize,

    #[serde(default = "default_latitude")]
    pub latitude: f64,

    #[serde(default = "default_longitude")]
    pub longitude: f64,

    #[serde(default = "default_holidays")]
    pub holidays: Vec<NaiveDate>,

    #[serde(default = "default_special_events")]
    pub special_events: Vec<NaiveDate>,

    #[serde(default = "default_facilities")]
    pub facilities: Vec<FacilitySpec>,
}

fn default_api_port() -> u16 {
    8080
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_weather_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_weather_timeout() -> u64 {
    5
}

fn default_weather_cache() -> bool {
    true
}

fn default_weather_cache_ttl() -> u64 {
    DEFAULT_CACHE_TTL.as_secs()
}

fn default_weather_cache_max_entries() -> usize {
    DEFAULT_CACHE_MAX_ENTRIES
}

fn default_latitude() -> f64 {
    PredictorSettings::default().location.latitude
}

fn default_longitude() -> f64 {
    PredictorSettings::default().location.longitude
}

fn default_holidays() -> Vec<NaiveDate> {
    Calendar::standard().holidays.into_iter().collect()
}

fn default_special_events() -> Vec<NaiveDate> {
    Calendar::standard().special_events.into_iter().collect()
}

fn default_facilities() -> Vec<FacilitySpec> {
    PredictorSettings::default().facilities
}

impl ServerConfig {
    /// Load configuration from an optional `parking.toml` and `PARKING_*` environment variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("parking").required(false))
            .add_source(
                config::Environment::with_prefix("PARKING")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("holidays")
                    .with_list_parse_key("special_events"),
            )
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Parse configuration from TOML text, defaults filling the gaps
    pub fn from_toml(contents: &str) -> Result<Self> {
        config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Immutable settings for the prediction pipeline
    pub fn predictor_settings(&self) -> PredictorSettings {
        PredictorSettings {
            calendar: Calendar::new(self.holidays.iter().copied(), self.special_events.iter().copied()),
            location: GeoPoint {
                latitude: self.latitude,
                longitude: self.longitude,
            },
            weather_timeout: Duration::from_secs(self.weather_timeout_secs),
            facilities: self.facilities.clone(),
        }
    }

    pub fn weather_config(&self) -> VisualCrossingConfig {
        VisualCrossingConfig {
            base_url: self.weather_base_url.clone(),
            api_key: self.weather_api_key.clone(),
            request_timeout: Duration::from_secs(self.weather_timeout_secs),
        }
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: Duration::from_secs(self.weather_cache_ttl_secs),
            max_entries: self.weather_cache_max_entries,
        }
    }
}
