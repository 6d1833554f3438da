//! HTTP surface and configuration for the parking slot predictor

pub mod api;
pub mod config;
