//! Prediction output formatting and post-processing
//!
//! Converts raw classifier and regressor outputs into a PredictionResult
//! and renders the headline texts shown to the user.

use crate::models::{InvestmentLabel, PredictionResult};
use tracing::warn;

/// Probability at or above which the classifier is expected to say "good"
pub const DEFAULT_DECISION_THRESHOLD: f64 = 0.5;

/// Configuration for output formatting
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Classifier decision threshold used for the consistency check
    pub decision_threshold: f64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            decision_threshold: DEFAULT_DECISION_THRESHOLD,
        }
    }
}

/// Formats raw model outputs into a PredictionResult
pub struct OutputFormatter {
    config: OutputConfig,
}

impl OutputFormatter {
    pub fn new() -> Self {
        Self {
            config: OutputConfig::default(),
        }
    }

    pub fn with_config(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Build a PredictionResult from raw outputs
    ///
    /// The label is the classifier's own; a disagreement with the
    /// probability and threshold is logged, never corrected.
    pub fn format(&self, raw_class: i64, raw_probability: f64, raw_value: f64) -> PredictionResult {
        let label = InvestmentLabel::from_class(raw_class);
        let confidence = self.calculate_confidence(raw_probability);

        if !self.is_consistent(label, raw_probability) {
            warn!(
                event = "label_probability_disagreement",
                class = raw_class,
                probability = raw_probability,
                threshold = self.config.decision_threshold,
                "Classifier label disagrees with its probability at the decision threshold"
            );
        }

        PredictionResult {
            label,
            confidence,
            future_price_lakhs: raw_value,
        }
    }

    /// Clamp to [0, 1]; NaN maps to 0
    fn calculate_confidence(&self, raw_probability: f64) -> f64 {
        if raw_probability.is_nan() {
            return 0.0;
        }
        raw_probability.clamp(0.0, 1.0)
    }

    /// Whether `label` is what the threshold implies for `probability`
    pub fn is_consistent(&self, label: InvestmentLabel, probability: f64) -> bool {
        label.is_good() == (probability >= self.config.decision_threshold)
    }

    /// "Good Investment (Confidence: 0.87)"
    pub fn headline(&self, result: &PredictionResult) -> String {
        format!("{} (Confidence: {:.2})", result.label, result.confidence)
    }

    /// "Estimated Price After 5 Years: 123.45 Lakhs"
    pub fn price_line(&self, result: &PredictionResult) -> String {
        format!(
            "Estimated Price After 5 Years: {:.2} Lakhs",
            result.future_price_lakhs
        )
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new()
    }
}
