//! Error types for ekf_slam

use thiserror::Error;

/// Main error type for the EKF-SLAM estimator and its collaborators
#[derive(Debug, Error)]
pub enum SlamError {
    /// `correct` was called with a landmark index that is not tracked
    #[error("Invalid landmark index {index} (tracking {landmark_count} landmarks)")]
    InvalidIndex { index: usize, landmark_count: usize },

    /// The 2x2 innovation covariance could not be inverted
    #[error("Singular innovation covariance for landmark {index} (det = {determinant:e})")]
    SingularInnovationCovariance { index: usize, determinant: f64 },

    /// State vector and covariance dimensions disagree
    #[error("Dimension mismatch: state has {state} entries, covariance is {rows}x{cols}")]
    DimensionMismatch { state: usize, rows: usize, cols: usize },

    /// Invalid configuration parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Observation or control with non-finite / out-of-domain values
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    /// Visualization error
    #[error("Visualization error: {0}")]
    Visualization(String),
}

/// Result type alias for SLAM operations
pub type SlamResult<T> = Result<T, SlamError>;
