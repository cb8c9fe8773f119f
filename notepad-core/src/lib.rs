//! # Notepad Pro Core
//!
//! Session state for the note editor: what the user typed, how it is styled,
//! and the document tree the editor view is built from.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  AppState                   │
//! ├──────────────────────┬──────────────────────┤
//! │  NoteContent         │  StyleAttributes     │
//! │  - plain text        │  - typed merge       │
//! │  - stickers          │  - toolbar toggles   │
//! ├──────────────────────┴──────────────────────┤
//! │  NoteView (live Document + region node)     │
//! │  ExportFlag (in-flight guard)               │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod document;
pub mod error;
pub mod note;
pub mod palette;
pub mod state;
pub mod style;
pub mod view;

pub use document::{Document, Extent, Layout, Node, NodeId, NodeKind, Overflow, Subtree};
pub use error::{NoteError, NoteResult};
pub use note::NoteContent;
pub use state::{AppState, ExportFlag, ExportGuard, ExportQuality, Tool};
pub use style::{Color, FontStyle, FontWeight, StyleAttributes, TextAlign, TextDecoration};
pub use view::NoteView;

/// Notepad core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
