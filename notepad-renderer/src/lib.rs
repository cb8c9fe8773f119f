//! # Notepad Pro Renderer
//!
//! Turns a styled note region into a shareable JPEG or PNG.
//!
//! ```text
//! NoteView ──capture──▶ CapturedImage ──compose──▶ CapturedImage ──encode──▶ ExportResult
//!  (live)   off-screen     (natural×scale)   story/post/original      (1080×1920…)   JPEG q95 / PNG
//!           clone + SVG
//! ```
//!
//! Rasterization goes through an SVG intermediate and the resvg/tiny-skia
//! pipeline; composition draws directly on tiny-skia pixmaps; encoding uses
//! the `image` crate.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bitmap;
pub mod capture;
pub mod compose;
pub mod encode;
pub mod error;
pub mod export;
pub mod fonts;
pub mod raster;

pub use bitmap::{CapturedImage, ImageFormat};
pub use capture::CaptureEngine;
pub use compose::{fit, ComposeConfig, Composer, ExportFormat, Placement};
pub use encode::{encode, encode_jpeg, encode_png, Encoding, ExportResult, DEFAULT_JPEG_QUALITY};
pub use error::{RenderError, RenderResult};
pub use export::{ExportConfig, NoteExporter};
pub use raster::{RasterOptions, Rasterizer, SvgRasterizer, MAX_CANVAS_SIDE};
