//! In-memory bitmaps and format sniffing.

use tiny_skia::{IntSize, Pixmap};

use crate::error::{RenderError, RenderResult};

/// A rasterized note region.
///
/// Pixels are premultiplied RGBA, as produced by tiny-skia.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pixmap: Pixmap,
}

impl CapturedImage {
    /// Wrap a pixmap.
    #[must_use]
    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self { pixmap }
    }

    /// Build from straight (non-premultiplied) RGBA bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size is zero or does not match the data length.
    pub fn from_rgba(width: u32, height: u32, data: &[u8]) -> RenderResult<Self> {
        let size = IntSize::from_wh(width, height)
            .ok_or_else(|| RenderError::RasterizationFailed("Empty bitmap".to_string()))?;
        if data.len() != (width as usize) * (height as usize) * 4 {
            return Err(RenderError::RasterizationFailed(format!(
                "Expected {} bytes for {width}x{height}, got {}",
                (width as usize) * (height as usize) * 4,
                data.len()
            )));
        }

        let mut premultiplied = Vec::with_capacity(data.len());
        for px in data.chunks_exact(4) {
            let a = u16::from(px[3]);
            for &c in &px[..3] {
                #[allow(clippy::cast_possible_truncation)]
                premultiplied.push(((u16::from(c) * a + 127) / 255) as u8);
            }
            premultiplied.push(px[3]);
        }

        let pixmap = Pixmap::from_vec(premultiplied, size)
            .ok_or_else(|| RenderError::RasterizationFailed("Invalid pixmap".to_string()))?;
        Ok(Self { pixmap })
    }

    /// Decode PNG or JPEG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be decoded.
    pub fn decode(data: &[u8]) -> RenderResult<Self> {
        let img = image::load_from_memory(data)
            .map_err(|e| RenderError::RasterizationFailed(format!("Failed to decode image: {e}")))?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba(width, height, rgba.as_raw())
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// The underlying pixmap.
    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Straight RGBA of one pixel, if in bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
    }
}

/// Encoded image formats the exporter can recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        Self::Unknown
    }
}
