//! Core library for the real estate investment advisor
//!
//! This crate provides:
//! - Property and feature data models
//! - Feature derivation from raw property attributes
//! - ONNX-backed classifier and regressor adapters
//! - A load-once model store and the prediction service
//! - Structured logging helpers

pub mod error;
pub mod models;
pub mod observability;
pub mod predictor;

pub use error::ModelError;
pub use models::*;
pub use observability::PredictionLogger;
