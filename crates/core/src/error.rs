//! Error types for poremark

use thiserror::Error;

/// Main error type for poremark operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("unsupported dimensionality: {ndim} (only 2-d and 3-d images are supported)")]
    UnsupportedDimension { ndim: usize },

    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for poremark operations
pub type Result<T> = std::result::Result<T, Error>;
