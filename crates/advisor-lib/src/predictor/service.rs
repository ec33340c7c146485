//! Prediction service
//!
//! Runs the classifier and regressor on one feature record. Each call is
//! synchronous and carries no state between invocations beyond counters.

use super::frame::FeatureFrame;
use super::output::{OutputConfig, OutputFormatter};
use super::store::ModelPair;
use crate::models::{FeatureRecord, PredictionResult};
use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Latency above which a prediction is counted as slow
const SLOW_PREDICTION: Duration = Duration::from_millis(50);

/// Wraps the loaded model pair behind a single inference call
pub struct PredictionService {
    models: Arc<ModelPair>,
    formatter: OutputFormatter,
    prediction_count: AtomicU64,
    slow_prediction_count: AtomicU64,
}

impl PredictionService {
    pub fn new(models: Arc<ModelPair>) -> Self {
        Self::with_config(models, OutputConfig::default())
    }

    pub fn with_config(models: Arc<ModelPair>, config: OutputConfig) -> Self {
        Self {
            models,
            formatter: OutputFormatter::with_config(config),
            prediction_count: AtomicU64::new(0),
            slow_prediction_count: AtomicU64::new(0),
        }
    }

    /// Classify and price one feature record
    ///
    /// Label, probability and value are each requested exactly once, all on
    /// the same frame. Model errors propagate untranslated.
    pub fn predict(&self, features: &FeatureRecord) -> Result<PredictionResult> {
        let start = Instant::now();
        let frame = FeatureFrame::from(features);

        let class = self.models.classifier.predict_label(&frame)?;
        let probability = self.models.classifier.predict_proba(&frame)?;
        let future_price = self.models.regressor.predict_value(&frame)?;

        let elapsed = start.elapsed();
        self.prediction_count.fetch_add(1, Ordering::Relaxed);
        if elapsed > SLOW_PREDICTION {
            self.slow_prediction_count.fetch_add(1, Ordering::Relaxed);
            warn!(elapsed_ms = elapsed.as_millis(), "Prediction exceeded {:?} target", SLOW_PREDICTION);
        } else {
            debug!(elapsed_us = elapsed.as_micros(), "Prediction completed");
        }

        Ok(self.formatter.format(class, probability, future_price))
    }

    pub fn formatter(&self) -> &OutputFormatter {
        &self.formatter
    }

    /// Get inference statistics
    pub fn stats(&self) -> InferenceStats {
        InferenceStats {
            total_predictions: self.prediction_count.load(Ordering::Relaxed),
            slow_predictions: self.slow_prediction_count.load(Ordering::Relaxed),
        }
    }
}

/// Inference statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceStats {
    pub total_predictions: u64,
    pub slow_predictions: u64,
}
