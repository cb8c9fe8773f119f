//! The live editor view.

use std::sync::{Mutex, PoisonError};

use crate::{
    Document, Extent, Layout, Node, NodeId, NodeKind, NoteContent, Overflow, StyleAttributes,
};

/// Hint shown in an empty editor.
pub const PLACEHOLDER: &str = "Start typing your note here...";

/// Editor width in pixels.
pub const EDITOR_WIDTH: f32 = 600.0;
/// Visible editor height in pixels; longer notes scroll.
pub const EDITOR_HEIGHT: f32 = 400.0;
/// Inner padding of the editor region.
pub const EDITOR_PADDING: f32 = 24.0;

/// The page the note is displayed on, plus the node that holds the note.
///
/// The document sits behind a mutex so that a capture can briefly attach
/// scratch nodes while the rest of the application only holds `&NoteView`.
#[derive(Debug)]
pub struct NoteView {
    document: Mutex<Document>,
    region: NodeId,
}

impl NoteView {
    /// Build the editor page for the given content and style.
    #[must_use]
    pub fn build(content: &NoteContent, style: &StyleAttributes) -> Self {
        let mut document = Document::new(EDITOR_WIDTH + 2.0 * EDITOR_PADDING, 900.0);

        let region = document.attach(
            Node::new(NodeKind::Region)
                .with_layout(Layout {
                    x: 0.0,
                    y: 120.0,
                    width: EDITOR_WIDTH,
                    height: Extent::Fixed(EDITOR_HEIGHT),
                    overflow: Overflow::Scroll,
                    padding: EDITOR_PADDING,
                })
                .with_style(style.clone()),
        );

        let body = if content.is_blank() {
            NodeKind::Placeholder {
                text: PLACEHOLDER.to_string(),
            }
        } else {
            NodeKind::Text {
                content: content.as_str().to_string(),
            }
        };
        let footer = NodeKind::Footer {
            text: format!(
                "{} characters · Align: {}",
                content.char_count(),
                style.resolved_text_align()
            ),
        };

        for kind in [body, footer] {
            let node = Node::new(kind)
                .with_layout(Layout {
                    width: EDITOR_WIDTH - 2.0 * EDITOR_PADDING,
                    ..Layout::default()
                })
                .with_style(style.clone());
            // The region was attached above, so appending cannot miss.
            if let Err(e) = document.append_child(region, node) {
                tracing::error!("Failed to build editor view: {e}");
            }
        }

        Self {
            document: Mutex::new(document),
            region,
        }
    }

    /// ID of the styled note region.
    #[must_use]
    pub fn region(&self) -> NodeId {
        self.region
    }

    /// Run `f` with exclusive access to the page.
    pub fn with_document<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        let mut guard = self.document.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Number of nodes currently on the page.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.with_document(|doc| doc.node_count())
    }
}
