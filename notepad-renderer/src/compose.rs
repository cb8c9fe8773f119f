//! Composition of captured notes into shareable formats.
//!
//! | format     | canvas                     | background                     | extras          |
//! |------------|----------------------------|--------------------------------|-----------------|
//! | `story`    | 1080×1920                  | note color, or brand gradient  | shadow, caption |
//! | `post`     | square, `max(w, h, 1080)`  | note color                     | none            |
//! | `original` | captured size              | as captured                    | none            |

use std::fmt::Write;

use notepad_core::palette::{BRAND_PRIMARY, BRAND_SECONDARY};
use notepad_core::Color;
use serde::{Deserialize, Serialize};
use tiny_skia::{
    FilterQuality, GradientStop, LinearGradient, Paint, Pixmap, PixmapPaint, Point, Rect,
    SpreadMode, Transform,
};

use crate::bitmap::CapturedImage;
use crate::error::{RenderError, RenderResult};
use crate::fonts;
use crate::raster::{escape_xml, MAX_CANVAS_SIDE};

/// Target layout of an exported image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Vertical 9:16 story.
    Story,
    /// Square post.
    Post,
    /// The capture as-is.
    Original,
}

impl ExportFormat {
    /// All formats, in menu order.
    pub const ALL: [Self; 3] = [Self::Story, Self::Post, Self::Original];

    /// Declared aspect ratio as `(width, height)`; `None` keeps the source ratio.
    #[must_use]
    pub fn aspect_ratio(self) -> Option<(u32, u32)> {
        match self {
            Self::Story => Some((9, 16)),
            Self::Post => Some((1, 1)),
            Self::Original => None,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Story => "story",
            Self::Post => "post",
            Self::Original => "original",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "story" => Ok(Self::Story),
            "post" => Ok(Self::Post),
            "original" => Ok(Self::Original),
            _ => Err(RenderError::UnknownFormat(s.to_string())),
        }
    }
}

/// Composition constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComposeConfig {
    /// Story canvas width.
    pub story_width: u32,
    /// Story canvas height.
    pub story_height: u32,
    /// Fraction of the story width the note may occupy.
    pub story_fit_width: f32,
    /// Fraction of the story height the note may occupy.
    pub story_fit_height: f32,
    /// Smallest post side.
    pub post_min_side: u32,
    /// Fraction of the post side the note may occupy, on both axes.
    pub post_fit: f32,
    /// Background treated as "not customised".
    pub default_background: Color,
    /// First gradient stop (top-left).
    pub gradient_start: Color,
    /// Second gradient stop (bottom-right).
    pub gradient_end: Color,
    /// Caption stamped on stories.
    pub caption: String,
    /// Caption font size in pixels.
    pub caption_size: f32,
    /// Caption opacity.
    pub caption_opacity: f32,
    /// Distance from the bottom edge to the caption baseline.
    pub caption_margin: f32,
    /// Vertical shadow offset.
    pub shadow_offset: f32,
    /// How far the shadow fades out around the note.
    pub shadow_spread: f32,
    /// Total shadow opacity.
    pub shadow_opacity: f32,
    /// Largest canvas side composition will allocate.
    pub max_canvas_side: u32,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            story_width: 1080,
            story_height: 1920,
            story_fit_width: 0.8,
            story_fit_height: 0.6,
            post_min_side: 1080,
            post_fit: 0.85,
            default_background: Color::WHITE,
            gradient_start: BRAND_PRIMARY,
            gradient_end: BRAND_SECONDARY,
            caption: "Made with Notepad Pro".to_string(),
            caption_size: 28.0,
            caption_opacity: 0.6,
            caption_margin: 80.0,
            shadow_offset: 12.0,
            shadow_spread: 24.0,
            shadow_opacity: 0.3,
            max_canvas_side: MAX_CANVAS_SIDE,
        }
    }
}

/// Where the note lands on the output canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Drawn width.
    pub width: f32,
    /// Drawn height.
    pub height: f32,
    /// Uniform scale applied to the note.
    pub scale: f32,
}

/// Centre a `content_w × content_h` box on the canvas, scaled uniformly to
/// fit inside `frac_w` of the canvas width and `frac_h` of its height.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn fit(
    content_w: u32,
    content_h: u32,
    canvas_w: u32,
    canvas_h: u32,
    frac_w: f32,
    frac_h: f32,
) -> Placement {
    let (cw, ch) = (content_w.max(1) as f32, content_h.max(1) as f32);
    let (tw, th) = (canvas_w as f32, canvas_h as f32);

    let scale = (tw * frac_w / cw).min(th * frac_h / ch);
    let width = cw * scale;
    let height = ch * scale;

    Placement {
        x: (tw - width) / 2.0,
        y: (th - height) / 2.0,
        width,
        height,
        scale,
    }
}

/// Number of stacked rectangles that make up the soft shadow.
const SHADOW_LAYERS: u8 = 8;

/// Re-composes captured notes into export formats.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    config: ComposeConfig,
}

impl Composer {
    /// Create a composer with the given configuration.
    #[must_use]
    pub fn new(config: ComposeConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    /// Compose `image` for `format` over the note's `background`.
    ///
    /// # Errors
    ///
    /// Returns an error if the output canvas would exceed
    /// `max_canvas_side`, cannot be allocated, or the caption cannot be
    /// laid out.
    pub fn compose(
        &self,
        image: &CapturedImage,
        format: ExportFormat,
        background: Color,
    ) -> RenderResult<CapturedImage> {
        let out = match format {
            ExportFormat::Story => self.compose_story(image, background)?,
            ExportFormat::Post => self.compose_post(image, background)?,
            ExportFormat::Original => image.clone(),
        };
        tracing::debug!(
            "Composed {format}: {}x{} -> {}x{}",
            image.width(),
            image.height(),
            out.width(),
            out.height()
        );
        Ok(out)
    }

    /// Where the note goes on a story canvas.
    #[must_use]
    pub fn story_placement(&self, image: &CapturedImage) -> Placement {
        let c = &self.config;
        fit(
            image.width(),
            image.height(),
            c.story_width,
            c.story_height,
            c.story_fit_width,
            c.story_fit_height,
        )
    }

    /// Side of the post canvas for a capture.
    #[must_use]
    pub fn post_side(&self, image: &CapturedImage) -> u32 {
        image
            .width()
            .max(image.height())
            .max(self.config.post_min_side)
    }

    fn compose_story(&self, image: &CapturedImage, background: Color) -> RenderResult<CapturedImage> {
        let c = &self.config;
        let mut canvas = self.new_canvas(c.story_width, c.story_height)?;

        if background == c.default_background {
            self.fill_gradient(&mut canvas)?;
        } else {
            canvas.fill(to_skia(background));
        }

        let placement = self.story_placement(image);
        self.draw_shadow(&mut canvas, &placement);
        draw_scaled(&mut canvas, image, &placement);
        self.stamp_caption(&mut canvas)?;

        Ok(CapturedImage::from_pixmap(canvas))
    }

    fn compose_post(&self, image: &CapturedImage, background: Color) -> RenderResult<CapturedImage> {
        let side = self.post_side(image);
        let mut canvas = self.new_canvas(side, side)?;
        canvas.fill(to_skia(background));

        let fraction = self.config.post_fit;
        let placement = fit(image.width(), image.height(), side, side, fraction, fraction);
        draw_scaled(&mut canvas, image, &placement);

        Ok(CapturedImage::from_pixmap(canvas))
    }

    fn new_canvas(&self, width: u32, height: u32) -> RenderResult<Pixmap> {
        let limit = self.config.max_canvas_side;
        if width > limit || height > limit {
            return Err(RenderError::Compose(format!(
                "{width}x{height} canvas exceeds the {limit} pixel limit"
            )));
        }
        Pixmap::new(width, height)
            .ok_or_else(|| RenderError::Compose(format!("Cannot allocate {width}x{height} canvas")))
    }

    #[allow(clippy::cast_precision_loss)]
    fn fill_gradient(&self, canvas: &mut Pixmap) -> RenderResult<()> {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let shader = LinearGradient::new(
            Point::from_xy(0.0, 0.0),
            Point::from_xy(w, h),
            vec![
                GradientStop::new(0.0, to_skia(self.config.gradient_start)),
                GradientStop::new(1.0, to_skia(self.config.gradient_end)),
            ],
            SpreadMode::Pad,
            Transform::identity(),
        )
        .ok_or_else(|| RenderError::Compose("Invalid background gradient".to_string()))?;

        let mut paint = Paint::default();
        paint.shader = shader;
        let rect = Rect::from_xywh(0.0, 0.0, w, h)
            .ok_or_else(|| RenderError::Compose("Invalid canvas rect".to_string()))?;
        canvas.fill_rect(rect, &paint, Transform::identity(), None);
        Ok(())
    }

    /// Soft shadow from stacked, increasingly large translucent rectangles.
    fn draw_shadow(&self, canvas: &mut Pixmap, placement: &Placement) {
        let c = &self.config;
        let per_layer = c.shadow_opacity / f32::from(SHADOW_LAYERS);

        let Some(shade) = tiny_skia::Color::from_rgba(0.0, 0.0, 0.0, per_layer) else {
            return;
        };
        let mut paint = Paint::default();
        paint.anti_alias = true;
        paint.set_color(shade);

        for layer in 0..SHADOW_LAYERS {
            let grow =
                c.shadow_spread * f32::from(SHADOW_LAYERS - layer) / f32::from(SHADOW_LAYERS);
            let rect = Rect::from_xywh(
                placement.x - grow,
                placement.y - grow + c.shadow_offset,
                placement.width + grow * 2.0,
                placement.height + grow * 2.0,
            );
            if let Some(rect) = rect {
                canvas.fill_rect(rect, &paint, Transform::identity(), None);
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn stamp_caption(&self, canvas: &mut Pixmap) -> RenderResult<()> {
        let c = &self.config;
        if c.caption.is_empty() {
            return Ok(());
        }
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);

        let mut svg = String::with_capacity(256);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\">\
             <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-family=\"sans-serif\" \
             font-size=\"{}\" fill=\"#ffffff\" fill-opacity=\"{}\">{}</text></svg>",
            w / 2.0,
            h - c.caption_margin,
            c.caption_size,
            c.caption_opacity,
            escape_xml(&c.caption),
        );

        let tree = usvg::Tree::from_str(&svg, &fonts::svg_options())
            .map_err(|e| RenderError::Compose(format!("Caption layout failed: {e}")))?;
        resvg::render(&tree, Transform::identity(), &mut canvas.as_mut());
        Ok(())
    }
}

fn draw_scaled(canvas: &mut Pixmap, image: &CapturedImage, placement: &Placement) {
    let paint = PixmapPaint {
        quality: FilterQuality::Bicubic,
        ..PixmapPaint::default()
    };
    let transform = Transform::from_row(
        placement.scale,
        0.0,
        0.0,
        placement.scale,
        placement.x,
        placement.y,
    );
    canvas.draw_pixmap(0, 0, image.pixmap().as_ref(), &paint, transform, None);
}

fn to_skia(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> CapturedImage {
        let data = rgba.repeat((width * height) as usize);
        CapturedImage::from_rgba(width, height, &data).expect("bitmap")
    }

    #[test]
    fn test_fit_wide_content() {
        let p = fit(2000, 500, 1080, 1920, 0.8, 0.6);
        assert!((p.width - 864.0).abs() < 0.01);
        assert!((p.height - 216.0).abs() < 0.01);
        assert!((p.x - 108.0).abs() < 0.01);
        assert!((p.y - (1920.0 - 216.0) / 2.0).abs() < 0.01);
    }

    #[test]
    fn test_fit_tall_content() {
        let p = fit(500, 2000, 1080, 1920, 0.8, 0.6);
        assert!((p.height - 1152.0).abs() < 0.01);
        assert!(p.width < 864.0);
    }

    #[test]
    fn test_story_dimensions_and_gradient() {
        let composer = Composer::default();
        let out = composer
            .compose(&solid(600, 300, [255, 255, 255, 255]), ExportFormat::Story, Color::WHITE)
            .expect("story");
        assert_eq!((out.width(), out.height()), (1080, 1920));

        let corner = out.pixel(0, 0).expect("corner");
        assert!(corner[0].abs_diff(0x66) <= 2 && corner[2].abs_diff(0xea) <= 2, "{corner:?}");
        let far = out.pixel(1079, 1919).expect("far corner");
        assert!(far[0].abs_diff(0x76) <= 2 && far[2].abs_diff(0xa2) <= 2, "{far:?}");
    }

    #[test]
    fn test_story_uses_custom_background() {
        let composer = Composer::default();
        let bg = Color::rgb(0x48, 0xbb, 0x78);
        let out = composer
            .compose(&solid(600, 300, [0, 0, 0, 255]), ExportFormat::Story, bg)
            .expect("story");
        assert_eq!(out.pixel(5, 5), Some([0x48, 0xbb, 0x78, 255]));
        // Note centre is the note itself.
        assert_eq!(out.pixel(540, 960), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_story_is_deterministic() {
        let composer = Composer::default();
        let img = solid(320, 480, [200, 10, 10, 255]);
        let a = composer.compose(&img, ExportFormat::Story, Color::WHITE).expect("a");
        let b = composer.compose(&img, ExportFormat::Story, Color::WHITE).expect("b");
        assert_eq!(a.pixmap().data(), b.pixmap().data());
    }

    #[test]
    fn test_post_is_square_with_min_side() {
        let composer = Composer::default();
        let small = composer
            .compose(&solid(400, 100, [0, 0, 0, 255]), ExportFormat::Post, Color::WHITE)
            .expect("small");
        assert_eq!((small.width(), small.height()), (1080, 1080));
        assert_eq!(small.pixel(2, 2), Some([255, 255, 255, 255]));
        assert_eq!(small.pixel(540, 540), Some([0, 0, 0, 255]));

        let big = composer
            .compose(&solid(1500, 2400, [0, 0, 0, 255]), ExportFormat::Post, Color::WHITE)
            .expect("big");
        assert_eq!((big.width(), big.height()), (2400, 2400));
    }

    #[test]
    fn test_post_keeps_margin() {
        let composer = Composer::default();
        let out = composer
            .compose(&solid(1000, 1000, [0, 0, 0, 255]), ExportFormat::Post, Color::rgb(0xf5, 0x65, 0x65))
            .expect("post");
        // 85% of 1080 is 918, so the outer 81 pixels stay background.
        assert_eq!(out.pixel(75, 540), Some([0xf5, 0x65, 0x65, 255]));
        assert_eq!(out.pixel(90, 540), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_original_passes_through() {
        let composer = Composer::default();
        let img = solid(123, 45, [1, 2, 3, 255]);
        let out = composer
            .compose(&img, ExportFormat::Original, Color::rgb(9, 9, 9))
            .expect("original");
        assert_eq!((out.width(), out.height()), (123, 45));
        assert_eq!(out.pixmap().data(), img.pixmap().data());
    }

    #[test]
    fn test_post_larger_than_limit_is_refused() {
        let composer = Composer::new(ComposeConfig {
            max_canvas_side: 2000,
            ..ComposeConfig::default()
        });
        let err = composer
            .compose(&solid(300, 2400, [0, 0, 0, 255]), ExportFormat::Post, Color::WHITE)
            .expect_err("2400px post");
        assert!(matches!(err, RenderError::Compose(msg) if msg.contains("limit")));

        // Original never allocates a new canvas.
        let original = composer
            .compose(&solid(300, 2400, [0, 0, 0, 255]), ExportFormat::Original, Color::WHITE)
            .expect("original");
        assert_eq!(original.height(), 2400);
    }

    #[test]
    fn test_format_names() {
        for format in ExportFormat::ALL {
            assert_eq!(format.as_str().parse::<ExportFormat>().expect("parse"), format);
        }
        assert!("banner".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Story.aspect_ratio(), Some((9, 16)));
        assert_eq!(ExportFormat::Original.aspect_ratio(), None);
    }

    #[test]
    fn test_config_accepts_partial_json() {
        let config: ComposeConfig =
            serde_json::from_str(r#"{"caption":"hi","postMinSide":1}"#).expect("parse");
        assert_eq!(config.caption, "hi");
        assert_eq!(config.story_width, 1080);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn story_fit_stays_in_bounds(ratio in 0.05f32..=20.0, base in 50u32..3000) {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
                let (w, h) = if ratio >= 1.0 {
                    (((base as f32) * ratio) as u32, base)
                } else {
                    (base, ((base as f32) / ratio) as u32)
                };
                let p = fit(w, h, 1080, 1920, 0.8, 0.6);
                prop_assert!(p.width <= 864.0 + 0.01);
                prop_assert!(p.height <= 1152.0 + 0.01);
                prop_assert!(p.x >= 0.0 && p.y >= 0.0);
            }

            #[test]
            fn post_side_covers_capture(w in 1u32..2500, h in 1u32..2500) {
                let composer = Composer::default();
                let img = solid(w, h, [0, 0, 0, 255]);
                let side = composer.post_side(&img);
                prop_assert_eq!(side, w.max(h).max(1080));

                #[allow(clippy::cast_precision_loss)]
                let limit = side as f32 * 0.85 + 0.01;
                let p = fit(w, h, side, side, 0.85, 0.85);
                prop_assert!(p.width <= limit && p.height <= limit);
                prop_assert!(p.x >= 0.0 && p.y >= 0.0);
            }
        }
    }
}
