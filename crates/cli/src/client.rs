//! API client for communicating with the parking server

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

/// API client for the parking server
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request.
    ///
    /// Health endpoints answer 503 with a JSON body, so the body is decoded
    /// whatever the status.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        response.json().await.context("Failed to parse response")
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }

    /// Fetch slot predictions for one timestamp
    pub async fn slots(&self, date: &str) -> Result<Vec<SlotsRecord>> {
        self.post(
            "slots",
            &SlotsRequest {
                date: date.to_string(),
            },
        )
        .await
    }
}

// API response types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotsRequest {
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotsRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub datetime: String,
    pub total_slots: u32,
    pub total_occupied: u32,
    pub total_empty: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub consecutive_failures: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub components: HashMap<String, ComponentHealth>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_slots_posts_date() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/slots")
            .match_body(mockito::Matcher::Json(
                serde_json::json!({"date": "2026-11-08 20:00"}),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"id":1,"datetime":"2026-11-08 20:00","total_slots":120,"total_occupied":17,"total_empty":103},
                    {"id":2,"datetime":"2026-11-08 20:00","total_slots":30,"total_occupied":4,"total_empty":26}
                ]"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let records = client.slots("2026-11-08 20:00").await.unwrap();

        mock.assert_async().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, Some(1));
        assert_eq!(records[1].total_empty, 26);
    }

    #[tokio::test]
    async fn test_degraded_record_has_no_id() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/slots")
            .with_status(200)
            .with_body(
                r#"[{"datetime":"garbage","total_slots":0,"total_occupied":0,"total_empty":0}]"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let records = client.slots("garbage").await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].id.is_none());
    }

    #[tokio::test]
    async fn test_server_error_surfaces() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/slots")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client.slots("2026-01-01 10:00").await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_unhealthy_body_still_decoded() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/healthz")
            .with_status(503)
            .with_body(
                r#"{"status":"unhealthy","components":{"predictor":{"status":"unhealthy","message":"missing","last_check_timestamp":0}}}"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let health: HealthStatus = client.get("healthz").await.unwrap();
        assert_eq!(health.status, "unhealthy");
        assert_eq!(health.components["predictor"].consecutive_failures, 0);
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(ApiClient::new("not a url").is_err());
    }
}
