//! ML prediction engine

mod artifacts;
mod encoder;
mod facility;
mod features;
mod inference;
mod output;

pub use artifacts::{load_facility, sha256_hex, LoadedFacility};
pub use encoder::LabelEncoder;
pub use facility::{FacilityOutcome, FacilityPredictor};
pub use features::{
    assemble_row, parse_timestamp, FeatureColumn, FeatureExtractor, DATE_FORMAT, TIMESTAMP_FORMAT,
};
pub use inference::{OnnxRegressor, MAX_INFERENCE_MS};
pub use output::OccupancyFormatter;

use crate::error::PredictionResult;
use crate::models::WeatherCategory;

/// Trait for trained occupancy regressors
pub trait RegressionModel: Send + Sync {
    /// Estimate occupied slots for one feature row
    fn predict(&self, row: &[f32]) -> PredictionResult<f32>;
}

/// Trait for a facility's weather category encoder
pub trait WeatherEncoder: Send + Sync {
    /// Numeric code the facility's model was trained with
    fn encode(&self, category: WeatherCategory) -> PredictionResult<i64>;
}
