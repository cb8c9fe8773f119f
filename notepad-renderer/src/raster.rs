//! Rasterization of document nodes.
//!
//! [`Rasterizer`] is the capability the capture engine depends on.
//! [`SvgRasterizer`] lays a node subtree out as SVG and renders it with
//! resvg into a tiny-skia pixmap.

use std::fmt::Write;

use notepad_core::{
    Color, Document, Extent, FontStyle, FontWeight, Node, NodeId, NodeKind, StyleAttributes,
    TextAlign, TextDecoration,
};

use crate::bitmap::CapturedImage;
use crate::error::{RenderError, RenderResult};
use crate::fonts;

/// Largest bitmap side, in pixels, that capture and composition will allocate.
pub const MAX_CANVAS_SIDE: u32 = 16_384;

/// Options passed to a rasterizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    /// Output pixels per layout pixel.
    pub scale: f32,
    /// Fill behind everything else.
    pub background_color: Color,
    /// Allow cross-origin resources (ignored by the SVG rasterizer).
    pub use_cors: bool,
    /// Output larger than this on either axis is refused.
    pub max_side: u32,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            background_color: Color::WHITE,
            use_cors: true,
            max_side: MAX_CANVAS_SIDE,
        }
    }
}

/// Turns a node of a document into a bitmap.
pub trait Rasterizer: Send + Sync {
    /// Rasterize `node` and its visible descendants at `options.scale`.
    ///
    /// # Errors
    ///
    /// Returns an error if the node cannot be laid out or rendered.
    fn rasterize(
        &self,
        document: &Document,
        node: NodeId,
        options: &RasterOptions,
    ) -> RenderResult<CapturedImage>;
}

/// Approximate glyph advance as a fraction of the font size.
const GLYPH_ADVANCE: f32 = 0.55;
const BOLD_GLYPH_ADVANCE: f32 = 0.6;
/// Hint text is drawn at this fraction of the body size.
const HINT_SCALE: f32 = 0.7;

/// One laid-out line of text.
#[derive(Debug, Clone)]
struct Line {
    text: String,
    top: f32,
    height: f32,
    style: StyleAttributes,
    font_size: f32,
}

/// SVG-based rasterizer.
#[derive(Debug, Default, Clone, Copy)]
pub struct SvgRasterizer;

impl SvgRasterizer {
    /// Create a new rasterizer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Natural (unscaled) size of a node.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is not in the document.
    pub fn natural_size(&self, document: &Document, node: NodeId) -> RenderResult<(f32, f32)> {
        let root = document
            .get(node)
            .ok_or_else(|| RenderError::RasterizationFailed(format!("Node not found: {node}")))?;
        let (_, content_height) = layout_lines(document, root);
        Ok(box_size(root, content_height))
    }

    /// Lay out `node` and emit the SVG document for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is not in the document, the scale is
    /// not a positive finite number, or the output would exceed
    /// `options.max_side`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn render_to_svg(
        &self,
        document: &Document,
        node: NodeId,
        options: &RasterOptions,
    ) -> RenderResult<String> {
        if !(options.scale.is_finite() && options.scale > 0.0) {
            return Err(RenderError::RasterizationFailed(format!(
                "Invalid scale {}",
                options.scale
            )));
        }

        let root = document
            .get(node)
            .ok_or_else(|| RenderError::RasterizationFailed(format!("Node not found: {node}")))?;
        let (lines, content_height) = layout_lines(document, root);
        let (view_w, view_h) = box_size(root, content_height);

        let out_w = ((view_w * options.scale).ceil() as u32).max(1);
        let out_h = ((view_h * options.scale).ceil() as u32).max(1);
        if out_w > options.max_side || out_h > options.max_side {
            return Err(RenderError::RasterizationFailed(format!(
                "Output {out_w}x{out_h} exceeds the {} pixel limit",
                options.max_side
            )));
        }
        let root_style = root.style.clone().unwrap_or_default();
        let padding = root.layout.padding;

        let mut svg = String::with_capacity(1024 + lines.len() * 160);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {view_w} {view_h}\">",
        );
        let _ = write!(
            svg,
            "<rect width=\"100%\" height=\"100%\" {}/>",
            fill_attrs(options.background_color)
        );
        let _ = write!(
            svg,
            "<rect width=\"100%\" height=\"100%\" {}/>",
            fill_attrs(root_style.resolved_background())
        );

        for line in &lines {
            if line.text.is_empty() {
                continue;
            }
            render_line_svg(&mut svg, line, view_w, padding);
        }

        svg.push_str("</svg>");
        Ok(svg)
    }
}

impl Rasterizer for SvgRasterizer {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize(
        &self,
        document: &Document,
        node: NodeId,
        options: &RasterOptions,
    ) -> RenderResult<CapturedImage> {
        let svg = self.render_to_svg(document, node, options)?;

        let opt = fonts::svg_options();
        let tree = usvg::Tree::from_str(&svg, &opt)
            .map_err(|e| RenderError::RasterizationFailed(format!("SVG parsing failed: {e}")))?;

        let px_w = tree.size().width().ceil() as u32;
        let px_h = tree.size().height().ceil() as u32;

        let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1)).ok_or_else(|| {
            RenderError::RasterizationFailed("Failed to create pixmap".to_string())
        })?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
        tracing::trace!("Rasterized {node} to {px_w}x{px_h}");

        Ok(CapturedImage::from_pixmap(pixmap))
    }
}

/// Box size of `node` given the height of its laid-out content.
fn box_size(node: &Node, content_height: f32) -> (f32, f32) {
    let width = node.layout.width.max(1.0);
    let height = match node.layout.height {
        Extent::Auto => content_height + node.layout.padding * 2.0,
        Extent::Fixed(h) => h,
    };
    (width, height.max(1.0))
}

/// Lay out every visible text-bearing node under `root`, top to bottom.
fn layout_lines(document: &Document, root: &Node) -> (Vec<Line>, f32) {
    let inner_width = (root.layout.width - root.layout.padding * 2.0).max(1.0);
    let mut lines = Vec::new();
    let mut cursor = root.layout.padding;

    let mut stack = vec![root];
    let mut order = Vec::new();
    while let Some(node) = stack.pop() {
        if !node.visible {
            continue;
        }
        order.push(node);
        stack.extend(document.children(node.id).collect::<Vec<_>>().into_iter().rev());
    }

    for node in order {
        let (text, hint) = match &node.kind {
            NodeKind::Region => continue,
            NodeKind::Text { content } => (content.as_str(), false),
            NodeKind::Placeholder { text } | NodeKind::Footer { text } => (text.as_str(), true),
        };

        let style = node.style.clone().unwrap_or_default();
        let mut font_size = style.resolved_font_size();
        if hint {
            font_size *= HINT_SCALE;
        }
        let line_height = font_size * style.resolved_line_height();
        let advance = match style.resolved_font_weight() {
            FontWeight::Bold => BOLD_GLYPH_ADVANCE,
            FontWeight::Normal => GLYPH_ADVANCE,
        } * font_size;

        for text in wrap_text(text, inner_width, advance) {
            lines.push(Line {
                text,
                top: cursor,
                height: line_height,
                style: style.clone(),
                font_size,
            });
            cursor += line_height;
        }
    }

    let content_height = cursor - root.layout.padding;
    (lines, content_height)
}

/// Greedy word wrap using a fixed advance per character.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn wrap_text(text: &str, max_width: f32, advance: f32) -> Vec<String> {
    let max_chars = ((max_width / advance.max(0.1)).floor() as usize).max(1);
    let mut out = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_len = 0usize;

        for word in paragraph.split_whitespace() {
            let mut word_chars: Vec<char> = word.chars().collect();

            // Words longer than a line are hard-broken.
            while word_chars.len() > max_chars {
                if line_len > 0 {
                    out.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                let rest = word_chars.split_off(max_chars);
                out.push(word_chars.into_iter().collect());
                word_chars = rest;
            }

            let needed = if line_len == 0 {
                word_chars.len()
            } else {
                line_len + 1 + word_chars.len()
            };
            if needed > max_chars && line_len > 0 {
                out.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.extend(word_chars.iter());
            line_len += word_chars.len();
        }

        out.push(line);
    }

    out
}

/// Render one line of text into SVG.
fn render_line_svg(svg: &mut String, line: &Line, view_w: f32, padding: f32) {
    let style = &line.style;
    let (x, anchor) = match style.resolved_text_align() {
        TextAlign::Left => (padding, "start"),
        TextAlign::Center => (view_w / 2.0, "middle"),
        TextAlign::Right => (view_w - padding, "end"),
    };
    let baseline = line.top + (line.height - line.font_size) / 2.0 + line.font_size * 0.8;

    let _ = write!(
        svg,
        "<text x=\"{x}\" y=\"{baseline}\" text-anchor=\"{anchor}\" font-family=\"{}\" font-size=\"{}\" {}",
        escape_xml(style.resolved_font_family()),
        line.font_size,
        fill_attrs(style.resolved_color()),
    );
    if style.resolved_font_weight() == FontWeight::Bold {
        svg.push_str(" font-weight=\"bold\"");
    }
    if style.resolved_font_style() == FontStyle::Italic {
        svg.push_str(" font-style=\"italic\"");
    }
    if style.resolved_text_decoration() == TextDecoration::Underline {
        svg.push_str(" text-decoration=\"underline\"");
    }
    let _ = write!(
        svg,
        " xml:space=\"preserve\">{}</text>",
        escape_xml(&line.text)
    );
}

/// `fill` and `fill-opacity` attributes for a color.
fn fill_attrs(color: Color) -> String {
    let opacity = f32::from(color.a) / 255.0;
    format!(
        "fill=\"#{:02x}{:02x}{:02x}\" fill-opacity=\"{opacity}\"",
        color.r, color.g, color.b
    )
}

/// Escape special XML characters.
pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
