//! ONNX Runtime inference using tract
//!
//! Loads the exported occupancy regressors and runs them on a single
//! feature row per request.

use super::RegressionModel;
use crate::error::{PredictionError, PredictionResult};
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, warn};

/// Maximum inference latency before warning
pub const MAX_INFERENCE_MS: u128 = 5;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX-based regressor using tract for lightweight inference
pub struct OnnxRegressor {
    model: TractModel,
    num_features: usize,
}

impl OnnxRegressor {
    /// Create a regressor from model bytes taking `num_features` float inputs
    pub fn new(model_bytes: &[u8], num_features: usize) -> anyhow::Result<Self> {
        let model = Self::load_model(model_bytes, num_features)?;
        Ok(Self {
            model,
            num_features,
        })
    }

    /// Load and optimize an ONNX model from bytes
    fn load_model(model_bytes: &[u8], num_features: usize) -> anyhow::Result<TractModel> {
        use anyhow::Context;

        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, num_features]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;
        Ok(model)
    }

    fn row_to_tensor(&self, row: &[f32]) -> PredictionResult<Tensor> {
        if row.len() != self.num_features {
            return Err(PredictionError::Inference(format!(
                "feature row has {} values, expected {}",
                row.len(),
                self.num_features
            )));
        }
        let array = tract_ndarray::Array2::from_shape_vec((1, self.num_features), row.to_vec())
            .map_err(|e| PredictionError::Inference(e.to_string()))?;
        Ok(array.into())
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }
}

impl RegressionModel for OnnxRegressor {
    fn predict(&self, row: &[f32]) -> PredictionResult<f32> {
        let start = Instant::now();
        let input = self.row_to_tensor(row)?;

        let result = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| PredictionError::Inference(e.to_string()))?;
        let output = result
            .first()
            .ok_or_else(|| PredictionError::Inference("No output from model".to_string()))?;
        let values = output
            .cast_to::<f32>()
            .map_err(|e| PredictionError::Inference(e.to_string()))?;
        let estimate = values
            .as_slice::<f32>()
            .map_err(|e| PredictionError::Inference(e.to_string()))?
            .first()
            .copied()
            .ok_or_else(|| PredictionError::Inference("Model output is empty".to_string()))?;

        let elapsed = start.elapsed();
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            warn!(elapsed_ms = elapsed.as_millis(), "Inference exceeded {}ms target", MAX_INFERENCE_MS);
        } else {
            debug!(elapsed_us = elapsed.as_micros(), "Inference completed");
        }

        Ok(estimate)
    }
}
