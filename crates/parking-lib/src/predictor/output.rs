//! Prediction output formatting and post-processing
//!
//! Converts a raw regressor estimate into an occupied/empty split that
//! always sums to the facility capacity.

use crate::error::{PredictionError, PredictionResult};

/// Rounds and clamps raw estimates into `[0, total_slots]`
#[derive(Debug, Clone, Copy)]
pub struct OccupancyFormatter {
    total_slots: u32,
}

impl OccupancyFormatter {
    pub fn new(total_slots: u32) -> Self {
        Self { total_slots }
    }

    pub fn total_slots(&self) -> u32 {
        self.total_slots
    }

    /// Format a raw estimate into `(occupied, empty)`.
    ///
    /// Halfway values round to even. Non-finite estimates are rejected.
    pub fn format(&self, raw: f32) -> PredictionResult<(u32, u32)> {
        if !raw.is_finite() {
            return Err(PredictionError::Inference(format!(
                "model returned non-finite estimate {}",
                raw
            )));
        }

        let rounded = f64::from(raw).round_ties_even();
        let occupied = rounded.clamp(0.0, f64::from(self.total_slots)) as u32;
        Ok((occupied, self.total_slots - occupied))
    }
}
