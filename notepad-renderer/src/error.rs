//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while capturing, composing or encoding a note.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The node to capture is not in the document.
    #[error("Capture target not found: {0}")]
    CaptureTargetMissing(String),

    /// The rasterizer failed or produced nothing.
    #[error("Rasterization failed: {0}")]
    RasterizationFailed(String),

    /// The output canvas could not be built.
    #[error("Composition failed: {0}")]
    Compose(String),

    /// An export format name was not recognised.
    #[error("Unknown export format: {0}")]
    UnknownFormat(String),

    /// Encoding the final image failed.
    #[error("Export failed: {0}")]
    Export(String),
}
