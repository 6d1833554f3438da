//! Library for parking slot occupancy prediction
//!
//! This crate provides the core functionality for:
//! - Calendar feature derivation from request timestamps
//! - Weather lookup and classification
//! - Per-facility ML inference with isolated fallbacks
//! - The request pipeline that combines them
//! - Health checks and observability

pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod pipeline;
pub mod predictor;
pub mod settings;
pub mod weather;

pub use error::{PredictionError, PredictionResult};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{ServiceMetrics, StructuredLogger};
pub use pipeline::{SlotsPipeline, SlotsReport};
pub use settings::{Calendar, FacilitySpec, PredictorSettings};
