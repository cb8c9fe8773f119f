//! Gateway error types.

use notepad_renderer::RenderError;
use thiserror::Error;

use crate::platform::{DeliveryError, Notice};

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, ExportError>;

/// Errors surfaced by export and share operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The note has no content.
    #[error("Note is empty")]
    EmptyContent,

    /// Another export is already running.
    #[error("An export is already in progress")]
    Busy,

    /// The note region is missing from the view.
    #[error("Capture target not found: {0}")]
    CaptureTargetMissing(String),

    /// Rendering the note failed.
    #[error("Rasterization failed: {0}")]
    RasterizationFailed(String),

    /// Building the output canvas failed.
    #[error("Composition failed: {0}")]
    Compose(String),

    /// JPEG encoding failed.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// No share path worked.
    #[error("Sharing is not available")]
    ShareUnavailable,

    /// The user dismissed the share sheet.
    #[error("Share cancelled by user")]
    ShareCancelledByUser,

    /// Saving the file failed.
    #[error("Delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}

impl From<RenderError> for ExportError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::CaptureTargetMissing(msg) => Self::CaptureTargetMissing(msg),
            RenderError::RasterizationFailed(msg) => Self::RasterizationFailed(msg),
            RenderError::Compose(msg) | RenderError::UnknownFormat(msg) => Self::Compose(msg),
            RenderError::Export(msg) => Self::Encode(msg),
        }
    }
}

impl ExportError {
    /// The notice to show for this error, if any.
    ///
    /// `Busy` and user cancellation are silent.
    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        let message = match self {
            Self::Busy | Self::ShareCancelledByUser => return None,
            Self::EmptyContent => "Please add some content to the note first!",
            Self::CaptureTargetMissing(_)
            | Self::RasterizationFailed(_)
            | Self::Compose(_)
            | Self::Encode(_) => "Error exporting image. Please try again.",
            Self::ShareUnavailable => "Sharing is not available on this device.",
            Self::Delivery(_) => "Could not save the image. Please try again.",
        };
        Some(Notice::error(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_errors() {
        assert!(ExportError::Busy.notice().is_none());
        assert!(ExportError::ShareCancelledByUser.notice().is_none());
        assert!(ExportError::EmptyContent.notice().is_some());
    }

    #[test]
    fn test_render_errors_map_to_export_errors() {
        let err: ExportError = RenderError::Export("bad".to_string()).into();
        assert!(matches!(err, ExportError::Encode(msg) if msg == "bad"));

        let err: ExportError = RenderError::CaptureTargetMissing("n".to_string()).into();
        assert!(matches!(err, ExportError::CaptureTargetMissing(_)));
        assert_eq!(
            err.notice().map(|n| n.message),
            Some("Error exporting image. Please try again.".to_string())
        );
    }
}
