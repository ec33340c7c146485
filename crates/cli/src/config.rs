//! Configuration management for the CLI
//!
//! Sources, lowest precedence first: built-in defaults, the TOML config file,
//! `ADVISOR_*` environment variables, then command-line overrides.

use advisor_lib::predictor::{ArtifactPaths, OutputConfig, DEFAULT_DECISION_THRESHOLD};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CLASSIFIER_PATH: &str = "models/classification_model.onnx";
pub const DEFAULT_REGRESSOR_PATH: &str = "models/regression_model.onnx";

/// Advisor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Path to the investment classifier artifact
    pub classifier_path: PathBuf,
    /// Path to the future price regressor artifact
    pub regressor_path: PathBuf,
    /// Expected SHA-256 of the classifier artifact
    #[serde(default)]
    pub classifier_sha256: Option<String>,
    /// Expected SHA-256 of the regressor artifact
    #[serde(default)]
    pub regressor_sha256: Option<String>,
    /// Classifier decision threshold for the label consistency check
    pub decision_threshold: f64,
    /// Emit logs as JSON lines
    pub log_json: bool,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            classifier_path: PathBuf::from(DEFAULT_CLASSIFIER_PATH),
            regressor_path: PathBuf::from(DEFAULT_REGRESSOR_PATH),
            classifier_sha256: None,
            regressor_sha256: None,
            decision_threshold: DEFAULT_DECISION_THRESHOLD,
            log_json: false,
        }
    }
}

impl AdvisorConfig {
    /// Load configuration from defaults, file and environment
    ///
    /// An explicit `path` must exist; the per-user file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("classifier_path", DEFAULT_CLASSIFIER_PATH)?
            .set_default("regressor_path", DEFAULT_REGRESSOR_PATH)?
            .set_default("decision_threshold", DEFAULT_DECISION_THRESHOLD)?
            .set_default("log_json", false)?;

        match path {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                if let Some(path) = Self::user_config_path() {
                    builder = builder.add_source(config::File::from(path).required(false));
                }
            }
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("ADVISOR"))
            .build()
            .context("Failed to read configuration")?;

        let config: Self = settings
            .try_deserialize()
            .context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line artifact overrides
    pub fn with_overrides(mut self, classifier: Option<PathBuf>, regressor: Option<PathBuf>) -> Self {
        if let Some(path) = classifier {
            self.classifier_path = path;
        }
        if let Some(path) = regressor {
            self.regressor_path = path;
        }
        self
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            classifier: self.classifier_path.clone(),
            regressor: self.regressor_path.clone(),
            classifier_sha256: self.classifier_sha256.clone(),
            regressor_sha256: self.regressor_sha256.clone(),
        }
    }

    pub fn output_config(&self) -> OutputConfig {
        OutputConfig {
            decision_threshold: self.decision_threshold,
        }
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.decision_threshold) {
            anyhow::bail!(
                "decision_threshold must be within [0, 1], got {}",
                self.decision_threshold
            );
        }
        Ok(())
    }

    /// Get the per-user configuration file path
    fn user_config_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|home| home.join(".config").join("advisor").join("config.toml"))
    }
}
