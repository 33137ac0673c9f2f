use std::path::PathBuf;
use thiserror::Error;

/// Result type for snake_rl operations
pub type Result<T> = std::result::Result<T, RlError>;

/// Main error type for the learning core
#[derive(Debug, Error)]
pub enum RlError {
    /// A state or batch does not match the configured shape
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid configuration value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Action index outside the discrete action set
    #[error("Invalid action {action}: must be less than {num_actions}")]
    InvalidAction {
        action: usize,
        num_actions: usize,
    },

    /// No weight file exists for the requested checkpoint
    #[error("Checkpoint not found: {}", path.display())]
    CheckpointNotFound {
        path: PathBuf,
    },

    /// A weight file exists but cannot be applied to this estimator
    #[error("Checkpoint {} is incompatible: {reason}", path.display())]
    CheckpointIncompatible {
        path: PathBuf,
        reason: String,
    },

    /// Training was requested on an empty batch
    #[error("Empty buffer: {0}")]
    EmptyBuffer(String),

    /// Numerical computation errors
    #[error("Numerical error: {0}")]
    Numerical(String),

    /// Failure reported by an environment collaborator
    #[error("Environment error: {0}")]
    Environment(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<bincode::Error> for RlError {
    fn from(err: bincode::Error) -> Self {
        RlError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for RlError {
    fn from(err: serde_json::Error) -> Self {
        RlError::Serialization(err.to_string())
    }
}

// Helper functions for common error patterns
impl RlError {
    pub fn dimension_mismatch<E: Into<String>, A: Into<String>>(expected: E, actual: A) -> Self {
        RlError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        RlError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
