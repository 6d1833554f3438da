//! Per-facility occupancy prediction
//!
//! Both facilities share one implementation; what differs between them
//! (capacity, column order, model, encoder) is supplied at construction.

use super::{assemble_row, FeatureColumn, OccupancyFormatter, RegressionModel, WeatherEncoder};
use crate::error::{PredictionError, PredictionResult};
use crate::models::{CalendarFeatures, SlotsPrediction, WeatherCategory};
use crate::settings::FacilitySpec;
use std::sync::Arc;
use tracing::debug;

/// Result of one facility's prediction
#[derive(Debug)]
pub enum FacilityOutcome {
    Estimated { occupied: u32, empty: u32 },
    /// Encoder or model failed; reported as zero occupancy
    Fallback { total_slots: u32, error: PredictionError },
}

impl FacilityOutcome {
    pub fn occupied(&self) -> u32 {
        match self {
            FacilityOutcome::Estimated { occupied, .. } => *occupied,
            FacilityOutcome::Fallback { .. } => 0,
        }
    }

    pub fn empty(&self) -> u32 {
        match self {
            FacilityOutcome::Estimated { empty, .. } => *empty,
            FacilityOutcome::Fallback { total_slots, .. } => *total_slots,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, FacilityOutcome::Fallback { .. })
    }
}

/// A facility's model, encoder and static description
pub struct FacilityPredictor {
    id: u32,
    name: String,
    columns: Vec<FeatureColumn>,
    formatter: OccupancyFormatter,
    model: Arc<dyn RegressionModel>,
    encoder: Arc<dyn WeatherEncoder>,
}

impl FacilityPredictor {
    pub fn new(
        spec: &FacilitySpec,
        model: Arc<dyn RegressionModel>,
        encoder: Arc<dyn WeatherEncoder>,
    ) -> Self {
        Self {
            id: spec.id,
            name: spec.name.clone(),
            columns: spec.columns.clone(),
            formatter: OccupancyFormatter::new(spec.total_slots),
            model,
            encoder,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total_slots(&self) -> u32 {
        self.formatter.total_slots()
    }

    fn try_estimate(
        &self,
        features: &CalendarFeatures,
        category: WeatherCategory,
    ) -> PredictionResult<(u32, u32)> {
        let weather_encoded = self.encoder.encode(category)?;
        let row = assemble_row(&self.columns, features, weather_encoded);
        let raw = self.model.predict(&row)?;
        debug!(facility = self.id, raw_estimate = raw, "Model estimate");
        self.formatter.format(raw)
    }

    /// Estimate occupancy. Never fails: errors become a zero-occupancy fallback.
    pub fn estimate(&self, features: &CalendarFeatures, category: WeatherCategory) -> FacilityOutcome {
        match self.try_estimate(features, category) {
            Ok((occupied, empty)) => FacilityOutcome::Estimated { occupied, empty },
            Err(error) => FacilityOutcome::Fallback {
                total_slots: self.total_slots(),
                error,
            },
        }
    }

    /// `(occupied, empty)` for the given inputs
    pub fn predict(&self, features: &CalendarFeatures, category: WeatherCategory) -> (u32, u32) {
        let outcome = self.estimate(features, category);
        (outcome.occupied(), outcome.empty())
    }

    pub fn to_record(&self, datetime: &str, outcome: &FacilityOutcome) -> SlotsPrediction {
        SlotsPrediction {
            id: Some(self.id),
            datetime: datetime.to_string(),
            total_slots: self.total_slots(),
            total_occupied: outcome.occupied(),
            total_empty: outcome.empty(),
        }
    }
}
