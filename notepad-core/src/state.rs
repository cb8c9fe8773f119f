//! Application state management.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Color, NoteContent, NoteError, NoteView, StyleAttributes, TextAlign};

/// Toolbar tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Background color picker.
    Background,
    /// Bold/italic/underline and alignment.
    Text,
    /// Font size and text color.
    Effects,
    /// Share to another app.
    Share,
    /// Download as an image.
    Export,
}

impl std::str::FromStr for Tool {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "background" => Ok(Self::Background),
            "text" => Ok(Self::Text),
            "effects" => Ok(Self::Effects),
            "share" => Ok(Self::Share),
            "export" => Ok(Self::Export),
            _ => Err(NoteError::InvalidValue {
                field: "tool",
                value: s.to_string(),
            }),
        }
    }
}

/// Capture resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportQuality {
    /// Twice the on-screen resolution.
    #[default]
    High,
    /// On-screen resolution.
    Normal,
}

impl ExportQuality {
    /// Capture scale factor.
    #[must_use]
    pub fn scale(self) -> f32 {
        match self {
            Self::High => 2.0,
            Self::Normal => 1.0,
        }
    }
}

impl std::str::FromStr for ExportQuality {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "normal" => Ok(Self::Normal),
            _ => Err(NoteError::InvalidValue {
                field: "quality",
                value: s.to_string(),
            }),
        }
    }
}

/// Marks an export/share pipeline as in flight.
///
/// Cloning shares the same flag.
#[derive(Debug, Clone, Default)]
pub struct ExportFlag(Arc<AtomicBool>);

impl ExportFlag {
    /// Create a cleared flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag unless it is already set.
    ///
    /// Returns `None` while another pipeline holds it. The flag clears when
    /// the returned guard is dropped.
    #[must_use]
    pub fn try_acquire(&self) -> Option<ExportGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ExportGuard(Arc::clone(&self.0)))
    }

    /// Whether a pipeline is in flight; UI controls that trigger one stay
    /// disabled while this is true.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Holds the [`ExportFlag`] until dropped.
#[derive(Debug)]
pub struct ExportGuard(Arc<AtomicBool>);

impl Drop for ExportGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The complete application state.
#[derive(Debug)]
pub struct AppState {
    content: NoteContent,
    style: StyleAttributes,
    /// Open toolbar panel, if any.
    pub active_tool: Option<Tool>,
    /// Capture resolution for exports.
    pub quality: ExportQuality,
    exporting: ExportFlag,
    view: NoteView,
}

impl AppState {
    /// Create an empty note with the default style.
    #[must_use]
    pub fn new() -> Self {
        let content = NoteContent::default();
        let style = StyleAttributes::new();
        let view = NoteView::build(&content, &style);
        Self {
            content,
            style,
            active_tool: None,
            quality: ExportQuality::default(),
            exporting: ExportFlag::new(),
            view,
        }
    }

    /// Replace the note text.
    pub fn set_content(&mut self, content: impl Into<NoteContent>) {
        self.content = content.into();
        self.refresh_view();
    }

    /// Merge a style patch into the current style.
    pub fn apply_style(&mut self, patch: &StyleAttributes) {
        self.style.merge(patch);
        tracing::debug!("Style updated: {:?}", patch);
        self.refresh_view();
    }

    /// Set the note background.
    pub fn change_background(&mut self, color: Color) {
        self.apply_style(&StyleAttributes::background(color));
    }

    /// Flip bold.
    pub fn toggle_bold(&mut self) {
        let patch = self.style.bold_toggle();
        self.apply_style(&patch);
    }

    /// Flip italic.
    pub fn toggle_italic(&mut self) {
        let patch = self.style.italic_toggle();
        self.apply_style(&patch);
    }

    /// Flip underline.
    pub fn toggle_underline(&mut self) {
        let patch = self.style.underline_toggle();
        self.apply_style(&patch);
    }

    /// Set the alignment.
    pub fn align(&mut self, align: TextAlign) {
        self.apply_style(&StyleAttributes::align(align));
    }

    /// Append a sticker to the note.
    pub fn insert_sticker(&mut self, sticker: &str) {
        self.content.push_sticker(sticker);
        self.refresh_view();
    }

    /// Open a toolbar panel, or close it if it is already open.
    pub fn select_tool(&mut self, tool: Tool) {
        self.active_tool = if self.active_tool == Some(tool) {
            None
        } else {
            Some(tool)
        };
    }

    /// Choose the capture resolution for later exports.
    pub fn set_quality(&mut self, quality: ExportQuality) {
        self.quality = quality;
    }

    /// The note text.
    #[must_use]
    pub fn content(&self) -> &NoteContent {
        &self.content
    }

    /// The current style.
    #[must_use]
    pub fn style(&self) -> &StyleAttributes {
        &self.style
    }

    /// The live editor view.
    #[must_use]
    pub fn view(&self) -> &NoteView {
        &self.view
    }

    /// The in-flight export flag.
    #[must_use]
    pub fn exporting(&self) -> &ExportFlag {
        &self.exporting
    }

    /// Whether export/share controls should be disabled.
    #[must_use]
    pub fn is_exporting(&self) -> bool {
        self.exporting.is_set()
    }

    fn refresh_view(&mut self) {
        self.view = NoteView::build(&self.content, &self.style);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
