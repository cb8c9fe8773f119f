//! Off-screen capture of the note region.
//!
//! The live region is clipped to the editor height and may be scrolled, so
//! it is never rasterized directly. Instead the region is cloned, the clone
//! is restyled, unclipped and stripped of editor hints, attached off-screen,
//! rasterized, and detached again.

use notepad_core::{Document, Extent, NodeId, Overflow, StyleAttributes, Subtree};

use crate::bitmap::CapturedImage;
use crate::error::{RenderError, RenderResult};
use crate::raster::{RasterOptions, Rasterizer, MAX_CANVAS_SIDE};

/// Where clones are parked while being rasterized.
pub const OFFSCREEN_OFFSET: f32 = -10_000.0;

/// An attached off-screen clone, detached on drop.
struct OffscreenClone<'a> {
    document: &'a mut Document,
    root: NodeId,
}

impl<'a> OffscreenClone<'a> {
    fn attach(document: &'a mut Document, subtree: Subtree) -> Self {
        let root = document.attach_subtree(subtree);
        Self { document, root }
    }

    fn document(&self) -> &Document {
        &*self.document
    }
}

impl Drop for OffscreenClone<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.document.detach(self.root) {
            tracing::warn!("Capture clone already gone: {e}");
        }
    }
}

/// Captures a styled region of a document as a bitmap.
pub struct CaptureEngine {
    rasterizer: Box<dyn Rasterizer>,
    max_side: u32,
}

impl CaptureEngine {
    /// Create an engine backed by the given rasterizer.
    #[must_use]
    pub fn new(rasterizer: Box<dyn Rasterizer>) -> Self {
        Self {
            rasterizer,
            max_side: MAX_CANVAS_SIDE,
        }
    }

    /// Refuse captures larger than `max_side` pixels on either axis.
    #[must_use]
    pub fn with_max_side(mut self, max_side: u32) -> Self {
        self.max_side = max_side;
        self
    }

    /// Rasterize `target` with `style` at `scale`.
    ///
    /// The document is left exactly as it was found, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::CaptureTargetMissing`] if `target` is not in
    /// the document and [`RenderError::RasterizationFailed`] if rendering
    /// fails or produces an empty or oversized bitmap.
    pub fn capture(
        &self,
        document: &mut Document,
        target: NodeId,
        style: &StyleAttributes,
        scale: f32,
    ) -> RenderResult<CapturedImage> {
        let mut subtree = document
            .clone_subtree(target)
            .map_err(|_| RenderError::CaptureTargetMissing(target.to_string()))?;
        prepare_clone(&mut subtree, style);

        let options = RasterOptions {
            scale,
            background_color: style.resolved_background(),
            use_cors: true,
            max_side: self.max_side,
        };

        let clone = OffscreenClone::attach(document, subtree);
        tracing::debug!(
            "Capturing {target} via off-screen clone {} at {scale}x",
            clone.root
        );

        let image = self
            .rasterizer
            .rasterize(clone.document(), clone.root, &options)
            .map_err(|e| match e {
                RenderError::RasterizationFailed(msg) => RenderError::RasterizationFailed(msg),
                other => RenderError::RasterizationFailed(other.to_string()),
            })?;

        if image.width() == 0 || image.height() == 0 {
            return Err(RenderError::RasterizationFailed(
                "Rasterizer returned an empty bitmap".to_string(),
            ));
        }
        if image.width() > self.max_side || image.height() > self.max_side {
            return Err(RenderError::RasterizationFailed(format!(
                "Captured {}x{} exceeds the {} pixel limit",
                image.width(),
                image.height(),
                self.max_side
            )));
        }

        tracing::debug!("Captured {}x{}", image.width(), image.height());
        Ok(image)
    }
}

impl std::fmt::Debug for CaptureEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureEngine").finish_non_exhaustive()
    }
}

/// Restyle, unclip and strip hints from a freshly cloned region.
fn prepare_clone(subtree: &mut Subtree, style: &StyleAttributes) {
    let root = subtree.root;
    for node in subtree.nodes_mut() {
        node.style = Some(style.clone());
        node.layout.height = Extent::Auto;
        node.layout.overflow = Overflow::Visible;
        if node.kind.is_hint() {
            node.visible = false;
        }
        if node.id == root {
            node.layout.x = OFFSCREEN_OFFSET;
            node.layout.y = OFFSCREEN_OFFSET;
        }
    }
}
