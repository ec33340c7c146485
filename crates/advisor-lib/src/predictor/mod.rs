//! Feature derivation and ML prediction engine

mod features;
mod frame;
mod inference;
mod output;
mod service;
mod store;

pub use features::{
    current_year, derive_features, derive_features_now, price_per_sqft, property_age,
    school_density_score, PRICE_UNIT, SCHOOL_DENSITY_DIVISOR,
};
pub use frame::{FeatureFrame, FeatureValue, FEATURE_COLUMNS};
pub use inference::{
    ModelInput, OnnxClassifier, OnnxModel, OnnxRegressor, LABEL_OUTPUT, POSITIVE_CLASS,
    PROBABILITY_OUTPUT, VALUE_OUTPUT,
};
pub use output::{OutputConfig, OutputFormatter, DEFAULT_DECISION_THRESHOLD};
pub use service::{InferenceStats, PredictionService};
pub use store::{
    compute_checksum, read_artifact, ArtifactPaths, ModelLoader, ModelPair, ModelStore,
    OnnxModelLoader,
};

use anyhow::Result;

/// Binary classifier over one feature row
pub trait Classifier: Send + Sync {
    /// Predicted class, 1 for the positive class
    fn predict_label(&self, frame: &FeatureFrame) -> Result<i64>;

    /// Probability of the positive class
    fn predict_proba(&self, frame: &FeatureFrame) -> Result<f64>;
}

/// Continuous regressor over one feature row
pub trait Regressor: Send + Sync {
    /// Point estimate for the row
    fn predict_value(&self, frame: &FeatureFrame) -> Result<f64>;
}
