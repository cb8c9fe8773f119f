//! Encoding of composed notes into downloadable images.

use base64::Engine;
use image::ImageEncoder;
use notepad_core::Color;
use serde::{Deserialize, Serialize};

use crate::bitmap::CapturedImage;
use crate::compose::ExportFormat;
use crate::error::{RenderError, RenderResult};

/// Default JPEG quality for exports.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// File encoding of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Encoding {
    /// Lossy JPEG at a quality of 1-100, flattened over the note background.
    Jpeg {
        /// Encoder quality.
        quality: u8,
    },
    /// Lossless PNG.
    Png,
}

impl Encoding {
    /// JPEG at `quality`, clamped to 1-100.
    #[must_use]
    pub fn jpeg(quality: u8) -> Self {
        Self::Jpeg {
            quality: quality.clamp(1, 100),
        }
    }

    /// MIME type of the encoded bytes.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// File extension, without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "jpg",
            Self::Png => "png",
        }
    }

    /// JPEG quality, if lossy.
    #[must_use]
    pub fn quality(self) -> Option<u8> {
        match self {
            Self::Jpeg { quality } => Some(quality),
            Self::Png => None,
        }
    }
}

impl Default for Encoding {
    fn default() -> Self {
        Self::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jpeg { quality } => write!(f, "jpeg q{quality}"),
            Self::Png => f.write_str("png"),
        }
    }
}

/// An encoded export, ready to be downloaded or shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    /// Encoded bytes.
    pub bytes: Vec<u8>,
    /// Encoding used.
    pub encoding: Encoding,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Layout the image was composed for.
    pub format: ExportFormat,
}

impl ExportResult {
    /// MIME type of the encoded bytes.
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        self.encoding.mime_type()
    }

    /// File extension, without the dot.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        self.encoding.extension()
    }

    /// Encoded size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the encoding produced nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `data:{mime};base64,...` URL for previews.
    #[must_use]
    pub fn to_data_url(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{encoded}", self.mime_type())
    }
}

/// Encode `image` with `encoding`. JPEG output is flattened over `background`.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn encode(
    image: &CapturedImage,
    format: ExportFormat,
    background: Color,
    encoding: Encoding,
) -> RenderResult<ExportResult> {
    match encoding {
        Encoding::Jpeg { quality } => encode_jpeg(image, format, background, quality),
        Encoding::Png => encode_png(image, format),
    }
}

/// Encode `image` as JPEG, flattening any transparency over `background`.
///
/// # Errors
///
/// Returns an error if encoding fails.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn encode_jpeg(
    image: &CapturedImage,
    format: ExportFormat,
    background: Color,
    quality: u8,
) -> RenderResult<ExportResult> {
    let quality = quality.clamp(1, 100);
    let (width, height) = (image.width(), image.height());
    let bg = [background.r, background.g, background.b];

    // Pixels are premultiplied, so compositing is `c + bg * (1 - a)`.
    let mut rgb_data = Vec::with_capacity((width as usize) * (height as usize) * 3);
    for pixel in image.pixmap().data().chunks_exact(4) {
        let inv = 1.0 - f32::from(pixel[3]) / 255.0;
        for channel in 0..3 {
            let value = f32::from(bg[channel]).mul_add(inv, f32::from(pixel[channel]));
            rgb_data.push(value.round().min(255.0) as u8);
        }
    }

    let mut buf = std::io::Cursor::new(Vec::new());
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
    encoder
        .write_image(&rgb_data, width, height, image::ColorType::Rgb8.into())
        .map_err(|e| RenderError::Export(format!("JPEG encoding failed: {e}")))?;

    let bytes = buf.into_inner();
    tracing::debug!("Encoded {format} {width}x{height} at q{quality}: {} bytes", bytes.len());

    Ok(ExportResult {
        bytes,
        encoding: Encoding::Jpeg { quality },
        width,
        height,
        format,
    })
}

/// Encode `image` as PNG, keeping its alpha channel.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn encode_png(image: &CapturedImage, format: ExportFormat) -> RenderResult<ExportResult> {
    let bytes = image
        .pixmap()
        .encode_png()
        .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))?;
    let (width, height) = (image.width(), image.height());
    tracing::debug!("Encoded {format} {width}x{height} as PNG: {} bytes", bytes.len());

    Ok(ExportResult {
        bytes,
        encoding: Encoding::Png,
        width,
        height,
        format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::ImageFormat;

    fn image_with(rgba: [u8; 4]) -> CapturedImage {
        let data: Vec<u8> = rgba.iter().copied().cycle().take(16 * 16 * 4).collect();
        CapturedImage::from_rgba(16, 16, &data).expect("bitmap")
    }

    #[test]
    fn test_jpeg_magic_bytes() {
        let result = encode_jpeg(
            &image_with([10, 20, 30, 255]),
            ExportFormat::Original,
            Color::WHITE,
            DEFAULT_JPEG_QUALITY,
        )
        .expect("encode");
        assert_eq!(&result.bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(ImageFormat::from_magic_bytes(&result.bytes), ImageFormat::Jpeg);
        assert_eq!((result.width, result.height), (16, 16));
        assert_eq!(result.encoding, Encoding::Jpeg { quality: 95 });
    }

    #[test]
    fn test_transparent_pixels_flatten_to_background() {
        let bg = Color::rgb(0xf5, 0x65, 0x65);
        let result = encode_jpeg(&image_with([0, 0, 0, 0]), ExportFormat::Post, bg, 100)
            .expect("encode");
        let decoded = CapturedImage::decode(&result.bytes).expect("decode");
        let px = decoded.pixel(8, 8).expect("pixel");
        assert!(px[0].abs_diff(0xf5) <= 3, "{px:?}");
        assert!(px[1].abs_diff(0x65) <= 3, "{px:?}");
        assert!(px[2].abs_diff(0x65) <= 3, "{px:?}");
    }

    #[test]
    fn test_quality_is_clamped() {
        let result = encode_jpeg(
            &image_with([1, 1, 1, 255]),
            ExportFormat::Story,
            Color::WHITE,
            0,
        )
        .expect("encode");
        assert_eq!(result.encoding.quality(), Some(1));
    }

    #[test]
    fn test_data_url() {
        let result = encode_jpeg(
            &image_with([1, 1, 1, 255]),
            ExportFormat::Story,
            Color::WHITE,
            80,
        )
        .expect("encode");
        let url = result.to_data_url();
        assert!(url.starts_with("data:image/jpeg;base64,/9j/"));
        assert_eq!(result.extension(), "jpg");
        assert!(!result.is_empty());
    }

    #[test]
    fn test_png_keeps_pixels_and_alpha() {
        let result = encode(
            &image_with([200, 100, 50, 128]),
            ExportFormat::Original,
            Color::WHITE,
            Encoding::Png,
        )
        .expect("encode");
        assert_eq!(ImageFormat::from_magic_bytes(&result.bytes), ImageFormat::Png);
        assert_eq!(result.extension(), "png");
        assert_eq!(result.encoding.quality(), None);
        assert!(result.to_data_url().starts_with("data:image/png;base64,iVBOR"));

        let decoded = CapturedImage::decode(&result.bytes).expect("decode");
        let px = decoded.pixel(3, 3).expect("pixel");
        assert_eq!(px[3], 128);
        assert!(px[0].abs_diff(200) <= 3, "{px:?}");
    }

    #[test]
    fn test_encoding_defaults_and_json() {
        assert_eq!(Encoding::default(), Encoding::Jpeg { quality: 95 });
        assert_eq!(Encoding::jpeg(0), Encoding::Jpeg { quality: 1 });
        assert_eq!(Encoding::Png.mime_type(), "image/png");

        let png: Encoding = serde_json::from_str(r#"{"type":"png"}"#).expect("png");
        assert_eq!(png, Encoding::Png);
        let jpeg: Encoding =
            serde_json::from_str(r#"{"type":"jpeg","quality":70}"#).expect("jpeg");
        assert_eq!(jpeg, Encoding::Jpeg { quality: 70 });
    }
}
