//! Scene error types.

use histoscope_core::HistoscopeError;
use thiserror::Error;

/// Errors reported by a scene graph.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The node id is not (or no longer) part of the scene.
    #[error("node {0} not found")]
    NodeNotFound(u64),

    /// Geometry uploaded to a node was malformed.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The viewport was given an unusable size.
    #[error("invalid viewport size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
}

/// A specialized Result type for scene operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

impl From<RenderError> for HistoscopeError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::NodeNotFound(id) => HistoscopeError::UnknownNode(id),
            other => HistoscopeError::Scene(other.to_string()),
        }
    }
}
