//! Parking Server - slot occupancy prediction service
//!
//! Loads the facility models once at startup and answers `POST /slots`
//! with per-facility occupancy estimates.

use anyhow::{Context, Result};
use parking_lib::{
    health::{components, HealthRegistry},
    observability::{ServiceMetrics, StructuredLogger},
    predictor::load_facility,
    weather::{CachedWeatherProvider, VisualCrossingProvider, WeatherProvider},
    SlotsPipeline,
};
use parking_server::{api, config::ServerConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting parking-server");

    let config = ServerConfig::load()?;
    info!(model_dir = %config.model_dir.display(), port = config.api_port, "Server configured");

    let health_registry = HealthRegistry::new();
    health_registry.register(components::PREDICTOR).await;
    health_registry.register(components::WEATHER_PROVIDER).await;

    let metrics = ServiceMetrics::new();
    let logger = StructuredLogger::new("parking-server");

    // Artifacts are loaded before serving; any failure aborts startup
    let settings = config.predictor_settings();
    let mut facilities = Vec::with_capacity(settings.facilities.len());
    for spec in &settings.facilities {
        let loaded = load_facility(spec, &config.model_dir)
            .with_context(|| format!("Failed to load artifacts for facility {}", spec.id))?;
        metrics.set_model_info(spec.id, &loaded.model_sha256);
        facilities.push(loaded.predictor);
    }

    let provider: Arc<dyn WeatherProvider> = Arc::new(
        VisualCrossingProvider::new(config.weather_config())
            .context("Failed to create weather provider")?,
    );
    let provider: Arc<dyn WeatherProvider> = if config.weather_cache {
        Arc::new(CachedWeatherProvider::with_config(provider, config.cache_config()))
    } else {
        provider
    };

    let pipeline = Arc::new(SlotsPipeline::new(&settings, provider, facilities));
    logger.log_startup(SERVER_VERSION, pipeline.facilities().len());

    let app_state = Arc::new(api::AppState::new(pipeline, health_registry.clone(), metrics));

    health_registry.set_ready(true).await;

    tokio::select! {
        result = api::serve(config.api_port, app_state) => {
            result.context("API server failed")?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
        }
    }

    info!("Shutting down");
    Ok(())
}
