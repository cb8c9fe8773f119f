//! # Notepad Pro Share
//!
//! Export and share gateway: turns the current note into a JPEG or PNG and
//! delivers it through whatever the platform offers.
//!
//! ```text
//! AppState ─▶ ExportFlag ─▶ validate ─▶ NoteExporter ─▶ download
//!                                                    └─▶ NativeShare
//!                                                         └─▶ WebIntentFallback
//!                                                              └─▶ DownloadFallback
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod gateway;
pub mod platform;
pub mod sharer;

pub use config::{GatewayConfig, ShareConfig};
pub use error::{ExportError, GatewayResult};
pub use gateway::{ExportGateway, Preview, ShareOutcome};
pub use platform::{
    Capabilities, DeliveryError, DirectoryDownloader, DownloadPrimitive, NativeShare,
    NativeShareError, Notice, NoticeLevel, Notifier, ShareRequest, SharedFile, TracingNotifier,
    UrlOpener,
};
pub use sharer::{CancelPolicy, ShareTarget, Sharer};
