//! Weather label encoder
//!
//! Each facility ships the vocabulary its model was fitted on; the numeric
//! code for a category is its index in that vocabulary.

use super::WeatherEncoder;
use crate::error::{PredictionError, PredictionResult};
use crate::models::WeatherCategory;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn from_classes<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a `{"classes": [...]}` artifact
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

impl WeatherEncoder for LabelEncoder {
    fn encode(&self, category: WeatherCategory) -> PredictionResult<i64> {
        self.classes
            .iter()
            .position(|c| c == category.as_str())
            .map(|idx| idx as i64)
            .ok_or(PredictionError::UnknownCategory { category })
    }
}
