//! Error types for histoscope-rs.

use thiserror::Error;

/// The main error type for histoscope-rs operations.
#[derive(Error, Debug)]
pub enum HistoscopeError {
    /// An axis domain has zero or negative width.
    #[error("degenerate domain [{min}, {max}]")]
    DegenerateDomain { min: f64, max: f64 },

    /// A zoom range is empty or inverted.
    #[error("invalid zoom range [{min}, {max}] on axis {axis}")]
    InvalidZoom { axis: char, min: f64, max: f64 },

    /// Data size mismatch.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// An index addressed something outside its container.
    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// A scene node id was not known to the scene graph.
    #[error("unknown scene node {0}")]
    UnknownNode(u64),

    /// The scene graph rejected an operation.
    #[error("scene error: {0}")]
    Scene(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for histoscope-rs operations.
pub type Result<T> = std::result::Result<T, HistoscopeError>;
