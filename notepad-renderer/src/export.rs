//! The render half of an export: capture, compose, encode.

use notepad_core::{NoteView, StyleAttributes};
use serde::{Deserialize, Serialize};

use crate::capture::CaptureEngine;
use crate::compose::{ComposeConfig, Composer, ExportFormat};
use crate::encode::{encode, Encoding, ExportResult, DEFAULT_JPEG_QUALITY};
use crate::error::RenderResult;
use crate::raster::{Rasterizer, SvgRasterizer};

/// Configuration for image export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportConfig {
    /// JPEG quality 1-100 (default: 95).
    pub jpeg_quality: u8,
    /// Composition constants.
    pub compose: ComposeConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            compose: ComposeConfig::default(),
        }
    }
}

/// Renders a live note view into an encoded export.
#[derive(Debug)]
pub struct NoteExporter {
    capture: CaptureEngine,
    composer: Composer,
    encoding: Encoding,
}

impl NoteExporter {
    /// Create an exporter backed by the given rasterizer.
    #[must_use]
    pub fn new(config: ExportConfig, rasterizer: Box<dyn Rasterizer>) -> Self {
        let capture =
            CaptureEngine::new(rasterizer).with_max_side(config.compose.max_canvas_side);
        Self {
            capture,
            composer: Composer::new(config.compose),
            encoding: Encoding::jpeg(config.jpeg_quality),
        }
    }

    /// Create an exporter with default configuration and the SVG rasterizer.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default(), Box::new(SvgRasterizer::new()))
    }

    /// Encoding used by [`export`](Self::export): JPEG at the configured quality.
    #[must_use]
    pub fn default_encoding(&self) -> Encoding {
        self.encoding
    }

    /// Capture the note region of `view`, compose it for `format` and encode
    /// it as JPEG.
    ///
    /// # Errors
    ///
    /// Returns the first stage error: capture, composition or encoding.
    pub fn export(
        &self,
        view: &NoteView,
        style: &StyleAttributes,
        format: ExportFormat,
        scale: f32,
    ) -> RenderResult<ExportResult> {
        self.export_as(view, style, format, scale, self.encoding)
    }

    /// Like [`export`](Self::export), with an explicit encoding.
    ///
    /// The view's document is locked only for the capture stage.
    ///
    /// # Errors
    ///
    /// Returns the first stage error: capture, composition or encoding.
    pub fn export_as(
        &self,
        view: &NoteView,
        style: &StyleAttributes,
        format: ExportFormat,
        scale: f32,
        encoding: Encoding,
    ) -> RenderResult<ExportResult> {
        let captured =
            view.with_document(|doc| self.capture.capture(doc, view.region(), style, scale))?;

        let background = style.resolved_background();
        let composed = self.composer.compose(&captured, format, background)?;
        encode(&composed, format, background, encoding)
    }
}

impl Default for NoteExporter {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::CapturedImage;
    use notepad_core::NoteContent;

    #[test]
    fn test_export_original_keeps_capture_size() {
        let style = StyleAttributes::new();
        let view = NoteView::build(&NoteContent::new("Hello"), &style);
        let exporter = NoteExporter::with_defaults();

        let result = exporter
            .export(&view, &style, ExportFormat::Original, 1.0)
            .expect("export");
        assert_eq!(result.width, 600);
        assert_eq!(result.format, ExportFormat::Original);

        let decoded = CapturedImage::decode(&result.bytes).expect("decode");
        assert_eq!((decoded.width(), decoded.height()), (result.width, result.height));
    }

    #[test]
    fn test_export_story_size() {
        let style = StyleAttributes::new();
        let view = NoteView::build(&NoteContent::new("Hello"), &style);
        let result = NoteExporter::with_defaults()
            .export(&view, &style, ExportFormat::Story, 2.0)
            .expect("export");
        assert_eq!((result.width, result.height), (1080, 1920));
        assert_eq!(result.encoding, Encoding::Jpeg { quality: 95 });
    }

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config: ExportConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(config, ExportConfig::default());
    }

    #[test]
    fn test_export_as_png() {
        let style = StyleAttributes::new();
        let view = NoteView::build(&NoteContent::new("Hello"), &style);
        let result = NoteExporter::with_defaults()
            .export_as(&view, &style, ExportFormat::Post, 1.0, Encoding::Png)
            .expect("export");
        assert_eq!(result.extension(), "png");
        assert_eq!(
            crate::bitmap::ImageFormat::from_magic_bytes(&result.bytes),
            crate::bitmap::ImageFormat::Png
        );
        assert_eq!((result.width, result.height), (1080, 1080));
    }
}
