//! Visual Crossing timeline API client

use super::{async_trait, WeatherProvider};
use crate::error::{PredictionError, PredictionResult};
use crate::models::GeoPoint;
use crate::predictor::DATE_FORMAT;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str =
    "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline";

/// Configuration for the Visual Crossing client
#[derive(Debug, Clone)]
pub struct VisualCrossingConfig {
    pub base_url: String,
    pub api_key: String,
    pub request_timeout: Duration,
}

impl Default for VisualCrossingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            request_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TimelineResponse {
    #[serde(default)]
    days: Vec<TimelineDay>,
}

#[derive(Debug, Deserialize)]
struct TimelineDay {
    icon: Option<String>,
}

/// Fetches the daily icon for a date from the timeline endpoint
pub struct VisualCrossingProvider {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl VisualCrossingProvider {
    pub fn new(config: VisualCrossingConfig) -> anyhow::Result<Self> {
        use anyhow::Context;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(&config.base_url).context("Invalid weather API URL")?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Weather API URL cannot be a base: {}", config.base_url);
        }

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
        })
    }

    fn request_url(&self, date: NaiveDate, location: GeoPoint) -> PredictionResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PredictionError::WeatherProvider("invalid base URL".to_string()))?
            .pop_if_empty()
            .push(&location.to_string())
            .push(&date.format(DATE_FORMAT).to_string());

        url.query_pairs_mut()
            .append_pair("unitGroup", "metric")
            .append_pair("include", "days")
            .append_pair("key", &self.api_key)
            .append_pair("contentType", "json");

        Ok(url)
    }
}

#[async_trait]
impl WeatherProvider for VisualCrossingProvider {
    async fn daily_condition(&self, date: NaiveDate, location: GeoPoint) -> PredictionResult<String> {
        let url = self.request_url(date, location)?;
        debug!(date = %date, location = %location, "Querying weather provider");

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(PredictionError::WeatherProvider(format!(
                "provider returned {}",
                response.status()
            )));
        }

        let body: TimelineResponse = response.json().await?;
        body.days
            .into_iter()
            .next()
            .ok_or_else(|| PredictionError::WeatherProvider("response has no days".to_string()))?
            .icon
            .ok_or_else(|| PredictionError::WeatherProvider("day has no icon".to_string()))
    }
}
