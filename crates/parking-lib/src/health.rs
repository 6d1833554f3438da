//! Health check infrastructure for the slot predictor
//!
//! Readiness follows artifact loading. Health follows request outcomes:
//! weather fallbacks degrade the weather provider component, and facility
//! fallbacks degrade the predictor, which turns unhealthy when every
//! facility falls back.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Health status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Component is functioning normally
    Healthy,
    /// Component is experiencing issues but still operational
    Degraded,
    /// Component has failed
    Unhealthy,
}

/// Information about a component's health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Failed requests since the component last succeeded
    #[serde(default)]
    pub consecutive_failures: u32,
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    pub fn healthy() -> Self {
        Self::with_status(ComponentStatus::Healthy, None, 0)
    }

    fn with_status(status: ComponentStatus, message: Option<String>, consecutive_failures: u32) -> Self {
        Self {
            status,
            message,
            consecutive_failures,
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// Overall health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: HashMap<String, ComponentHealth>,
}

impl HealthResponse {
    /// Compute overall status from component statuses
    pub fn compute_status(components: &HashMap<String, ComponentHealth>) -> ComponentStatus {
        let mut has_degraded = false;

        for health in components.values() {
            match health.status {
                ComponentStatus::Unhealthy => return ComponentStatus::Unhealthy,
                ComponentStatus::Degraded => has_degraded = true,
                ComponentStatus::Healthy => {}
            }
        }

        if has_degraded {
            ComponentStatus::Degraded
        } else {
            ComponentStatus::Healthy
        }
    }
}

/// Readiness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Component names for health tracking
pub mod components {
    pub const PREDICTOR: &str = "predictor";
    pub const WEATHER_PROVIDER: &str = "weather_provider";
}

/// Health registry for tracking component health
#[derive(Debug, Clone)]
pub struct HealthRegistry {
    components: Arc<RwLock<HashMap<String, ComponentHealth>>>,
    ready: Arc<RwLock<bool>>,
}

impl Default for HealthRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self {
            components: Arc::new(RwLock::new(HashMap::new())),
            ready: Arc::new(RwLock::new(false)),
        }
    }

    /// Register a component with initial healthy status
    pub async fn register(&self, name: &str) {
        let mut components = self.components.write().await;
        components.insert(name.to_string(), ComponentHealth::healthy());
    }

    fn previous_failures(components: &HashMap<String, ComponentHealth>, name: &str) -> u32 {
        components.get(name).map(|h| h.consecutive_failures).unwrap_or(0)
    }

    /// Record the outcome of a weather lookup.
    ///
    /// A fallback degrades the weather provider component; the next
    /// successful lookup restores it.
    pub async fn record_weather_lookup(&self, fallback_reason: Option<&str>) {
        let mut components = self.components.write().await;
        let failures = Self::previous_failures(&components, components::WEATHER_PROVIDER);

        let health = match fallback_reason {
            None => ComponentHealth::healthy(),
            Some(reason) => ComponentHealth::with_status(
                ComponentStatus::Degraded,
                Some(reason.to_string()),
                failures.saturating_add(1),
            ),
        };
        components.insert(components::WEATHER_PROVIDER.to_string(), health);
    }

    /// Record which facilities fell back during one request.
    ///
    /// Some facilities failing degrades the predictor; all of them failing
    /// makes it unhealthy, since every answer is then the zero fallback.
    pub async fn record_facility_outcomes(&self, fallbacks: &[u32], facility_count: usize) {
        let mut components = self.components.write().await;
        let failures = Self::previous_failures(&components, components::PREDICTOR);

        let health = if fallbacks.is_empty() {
            ComponentHealth::healthy()
        } else {
            let ids: Vec<String> = fallbacks.iter().map(u32::to_string).collect();
            let status = if fallbacks.len() >= facility_count {
                ComponentStatus::Unhealthy
            } else {
                ComponentStatus::Degraded
            };
            ComponentHealth::with_status(
                status,
                Some(format!("facility {} fell back", ids.join(", "))),
                failures.saturating_add(1),
            )
        };
        components.insert(components::PREDICTOR.to_string(), health);
    }

    /// Set readiness status
    pub async fn set_ready(&self, ready: bool) {
        let mut r = self.ready.write().await;
        *r = ready;
    }

    /// Get health response
    pub async fn health(&self) -> HealthResponse {
        let components = self.components.read().await.clone();
        let status = HealthResponse::compute_status(&components);
        HealthResponse { status, components }
    }

    /// Get readiness response.
    ///
    /// Only the loaded flag counts: request-driven health cannot recover
    /// without traffic, so it never takes the service out of rotation.
    pub async fn readiness(&self) -> ReadinessResponse {
        if *self.ready.read().await {
            ReadinessResponse {
                ready: true,
                reason: None,
            }
        } else {
            ReadinessResponse {
                ready: false,
                reason: Some("Facility models not loaded".to_string()),
            }
        }
    }
}
