//! Structured logging for the advisor
//!
//! Every event carries an `event` field and the surface that produced it so
//! JSON logs can be filtered without parsing messages.

use crate::models::{FeatureRecord, PredictionResult};
use crate::predictor::ArtifactPaths;
use tracing::{info, warn};

/// Structured logger for prediction events
#[derive(Debug, Clone)]
pub struct PredictionLogger {
    surface: String,
}

impl PredictionLogger {
    pub fn new(surface: &str) -> Self {
        Self {
            surface: surface.to_string(),
        }
    }

    pub fn surface(&self) -> &str {
        &self.surface
    }

    /// Log advisor startup
    pub fn log_startup(&self, version: &str, paths: &ArtifactPaths) {
        info!(
            event = "advisor_started",
            surface = %self.surface,
            version = %version,
            classifier = %paths.classifier.display(),
            regressor = %paths.regressor.display(),
            checksums = paths.classifier_sha256.is_some() || paths.regressor_sha256.is_some(),
            "Investment advisor started"
        );
    }

    /// Log the derived features of a request
    pub fn log_features(&self, features: &FeatureRecord) {
        info!(
            event = "features_derived",
            surface = %self.surface,
            city = %features.property.city,
            locality = %features.property.locality,
            price_per_sqft = features.price_per_sqft,
            property_age = features.property_age,
            school_density_score = features.school_density_score,
            "Features derived"
        );
    }

    /// Log a completed prediction
    pub fn log_prediction(&self, features: &FeatureRecord, result: &PredictionResult) {
        info!(
            event = "prediction",
            surface = %self.surface,
            city = %features.property.city,
            good_investment = result.label.is_good(),
            confidence = result.confidence,
            future_price_lakhs = result.future_price_lakhs,
            "Prediction completed"
        );
    }

    /// Log a failed prediction
    pub fn log_prediction_failure(&self, error: &anyhow::Error) {
        warn!(
            event = "prediction_failed",
            surface = %self.surface,
            error = %format!("{:#}", error),
            "Prediction failed"
        );
    }
}
