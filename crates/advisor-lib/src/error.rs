//! Errors raised while loading model artifacts or running inference

use std::path::PathBuf;
use thiserror::Error;

/// Failures of the model layer
///
/// Startup failures (missing, corrupt or tampered artifacts) are fatal.
/// Schema mismatches surface when a model asks for a column the feature
/// record cannot supply and are propagated unchanged to the caller.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model artifact not found: {}", path.display())]
    ArtifactMissing { path: PathBuf },

    #[error("model artifact {artifact} could not be loaded: {reason}")]
    ArtifactCorrupt { artifact: String, reason: String },

    #[error("checksum mismatch for {artifact}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        artifact: String,
        expected: String,
        actual: String,
    },

    #[error("feature schema mismatch on column '{column}': {reason}")]
    SchemaMismatch { column: String, reason: String },

    #[error("model {artifact} produced no value at output {index}")]
    MissingOutput { artifact: String, index: usize },
}

impl ModelError {
    /// True for errors that prevent the models from being loaded at all
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            ModelError::ArtifactMissing { .. }
                | ModelError::ArtifactCorrupt { .. }
                | ModelError::ChecksumMismatch { .. }
        )
    }
}
