//! Load-once model store
//!
//! The classifier and regressor are read from disk a single time and then
//! shared read-only by every prediction. Artifacts are assumed immutable for
//! the life of the process, so the store never invalidates.

use super::inference::{OnnxClassifier, OnnxRegressor};
use super::{Classifier, Regressor};
use crate::error::ModelError;
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Instant;
use tracing::{debug, info};

/// The two loaded models
pub struct ModelPair {
    pub classifier: Box<dyn Classifier>,
    pub regressor: Box<dyn Regressor>,
}

/// Produces a model pair; called at most once per successful store load
pub trait ModelLoader: Send + Sync {
    fn load(&self) -> Result<ModelPair>;
}

/// Locations and optional SHA-256 digests of the two artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub classifier: PathBuf,
    pub regressor: PathBuf,
    pub classifier_sha256: Option<String>,
    pub regressor_sha256: Option<String>,
}

impl ArtifactPaths {
    pub fn new(classifier: impl Into<PathBuf>, regressor: impl Into<PathBuf>) -> Self {
        Self {
            classifier: classifier.into(),
            regressor: regressor.into(),
            classifier_sha256: None,
            regressor_sha256: None,
        }
    }
}

/// Loads both artifacts as ONNX graphs
pub struct OnnxModelLoader {
    paths: ArtifactPaths,
}

impl OnnxModelLoader {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }
}

impl ModelLoader for OnnxModelLoader {
    fn load(&self) -> Result<ModelPair> {
        let classifier_bytes =
            read_artifact(&self.paths.classifier, self.paths.classifier_sha256.as_deref())?;
        let regressor_bytes =
            read_artifact(&self.paths.regressor, self.paths.regressor_sha256.as_deref())?;

        let classifier = OnnxClassifier::from_bytes(
            &self.paths.classifier.display().to_string(),
            &classifier_bytes,
        )?;
        let regressor = OnnxRegressor::from_bytes(
            &self.paths.regressor.display().to_string(),
            &regressor_bytes,
        )?;

        Ok(ModelPair {
            classifier: Box::new(classifier),
            regressor: Box::new(regressor),
        })
    }
}

/// Read an artifact, verifying its SHA-256 digest when one is expected
pub fn read_artifact(path: &Path, expected_sha256: Option<&str>) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(ModelError::ArtifactMissing {
            path: path.to_path_buf(),
        }
        .into());
    }

    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read model artifact {}", path.display()))?;

    if let Some(expected) = expected_sha256 {
        let actual = compute_checksum(&bytes);
        if !actual.eq_ignore_ascii_case(expected.trim()) {
            return Err(ModelError::ChecksumMismatch {
                artifact: path.display().to_string(),
                expected: expected.to_string(),
                actual,
            }
            .into());
        }
        debug!(artifact = %path.display(), "Checksum verified");
    }

    Ok(bytes)
}

/// Compute SHA256 checksum of data
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Lazily loaded, process-shared model pair
///
/// The first successful `get_or_load` fills the cell; later calls return the
/// same pair. Concurrent first callers wait on the load lock, so the loader
/// runs once. A failed load leaves the cell empty and is reported to the
/// caller, who treats it as fatal.
pub struct ModelStore {
    loader: Box<dyn ModelLoader>,
    models: OnceLock<Arc<ModelPair>>,
    load_lock: Mutex<()>,
}

impl ModelStore {
    pub fn new(loader: impl ModelLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            models: OnceLock::new(),
            load_lock: Mutex::new(()),
        }
    }

    pub fn get_or_load(&self) -> Result<Arc<ModelPair>> {
        if let Some(models) = self.models.get() {
            return Ok(Arc::clone(models));
        }

        // A panicked loader leaves nothing behind, so a poisoned lock is still usable
        let _guard = self
            .load_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(models) = self.models.get() {
            return Ok(Arc::clone(models));
        }

        let start = Instant::now();
        let loaded = Arc::new(self.loader.load().context("Failed to load models")?);
        info!(
            event = "models_loaded",
            elapsed_ms = start.elapsed().as_millis(),
            "Classifier and regressor loaded"
        );

        Ok(Arc::clone(self.models.get_or_init(|| loaded)))
    }

    pub fn is_loaded(&self) -> bool {
        self.models.get().is_some()
    }
}
