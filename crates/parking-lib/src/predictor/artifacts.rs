//! Model artifact loading
//!
//! Reads each facility's model and encoder from the model directory once at
//! startup. Any failure here must stop the process from serving.

use super::{FacilityPredictor, LabelEncoder, OnnxRegressor};
use crate::error::{PredictionError, PredictionResult};
use crate::settings::FacilitySpec;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// A facility predictor together with the checksum of its model file
pub struct LoadedFacility {
    pub predictor: FacilityPredictor,
    pub model_sha256: String,
}

/// Hex-encoded SHA-256 of `bytes`
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn read_artifact(path: &Path) -> PredictionResult<Vec<u8>> {
    fs::read(path).map_err(|e| PredictionError::ArtifactLoad {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Load the model and encoder described by `spec` from `model_dir`
pub fn load_facility(spec: &FacilitySpec, model_dir: &Path) -> PredictionResult<LoadedFacility> {
    let model_path = model_dir.join(&spec.model_file);
    let encoder_path = model_dir.join(&spec.encoder_file);

    let model_bytes = read_artifact(&model_path)?;
    let checksum = sha256_hex(&model_bytes);

    if let Some(expected) = &spec.model_sha256 {
        if !expected.eq_ignore_ascii_case(&checksum) {
            return Err(PredictionError::ArtifactLoad {
                path: model_path.display().to_string(),
                reason: format!("checksum mismatch: expected {}, got {}", expected, checksum),
            });
        }
    }

    let encoder_bytes = read_artifact(&encoder_path)?;
    let encoder = LabelEncoder::from_json(&encoder_bytes).map_err(|e| PredictionError::ArtifactLoad {
        path: encoder_path.display().to_string(),
        reason: e.to_string(),
    })?;
    if encoder.classes().is_empty() {
        return Err(PredictionError::ArtifactLoad {
            path: encoder_path.display().to_string(),
            reason: "encoder has no classes".to_string(),
        });
    }

    let model = OnnxRegressor::new(&model_bytes, spec.columns.len()).map_err(|e| {
        PredictionError::ArtifactLoad {
            path: model_path.display().to_string(),
            reason: format!("{:#}", e),
        }
    })?;

    info!(
        facility = spec.id,
        model = %model_path.display(),
        sha256 = %checksum,
        classes = ?encoder.classes(),
        "Loaded facility artifacts"
    );

    Ok(LoadedFacility {
        predictor: FacilityPredictor::new(spec, Arc::new(model), Arc::new(encoder)),
        model_sha256: checksum,
    })
}
