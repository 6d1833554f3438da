//! Error types for the prediction pipeline

use crate::models::WeatherCategory;
use thiserror::Error;

/// Errors raised inside the pipeline.
///
/// None of these reach HTTP callers: each stage resolves its own failures
/// into a fallback value, logs it, and records it in metrics.
#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("malformed timestamp {input:?}: expected YYYY-MM-DD HH:MM")]
    MalformedTimestamp { input: String },

    #[error("weather provider failure: {0}")]
    WeatherProvider(String),

    #[error("category {category} is not in the encoder vocabulary")]
    UnknownCategory { category: WeatherCategory },

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("failed to load artifact {path}: {reason}")]
    ArtifactLoad { path: String, reason: String },
}

impl From<reqwest::Error> for PredictionError {
    fn from(err: reqwest::Error) -> Self {
        PredictionError::WeatherProvider(err.to_string())
    }
}

pub type PredictionResult<T> = std::result::Result<T, PredictionError>;
