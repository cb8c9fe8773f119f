//! # Notepad Pro CLI
//!
//! Command-line host for Notepad Pro: styles a note and exports or shares
//! it as a JPEG, or saves it as a PNG.
//!
//! ## Usage
//!
//! ```bash
//! notepad-pro "Hello there" --format story --background '#667eea' --bold
//! echo "From stdin" | notepad-pro --format post --out ./exports
//! notepad-pro "Share me" --share whatsapp
//! notepad-pro "Lossless" --format original --png
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `run` - Builds an `AppState` from the arguments and drives the
//!   `ExportGateway` with filesystem download and a stdout URL opener

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use clap::Parser;
use notepad_core::palette::STICKERS;
use notepad_core::{AppState, Color, ExportQuality, StyleAttributes, TextAlign};
use notepad_renderer::{Encoding, ExportFormat};
use notepad_share::{
    Capabilities, DeliveryError, DirectoryDownloader, ExportGateway, GatewayConfig, Preview,
    ShareOutcome, ShareTarget, TracingNotifier, UrlOpener,
};
use tokio::io::AsyncReadExt;
use url::Url;

/// Command-line arguments for notepad-pro.
#[derive(Debug, Clone, Parser)]
#[command(name = "notepad-pro")]
#[command(about = "Style a note and export it as a story, post or original image")]
#[command(version)]
pub struct CliArgs {
    /// Note text (read from --input or stdin when omitted)
    pub text: Option<String>,

    /// Read the note text from a file
    #[arg(long, short, conflicts_with = "text")]
    pub input: Option<PathBuf>,

    /// Output layout: story, post or original
    #[arg(long, short, default_value = "post")]
    pub format: ExportFormat,

    /// Share instead of saving: whatsapp, facebook or system
    #[arg(long)]
    pub share: Option<ShareTarget>,

    /// Render and print a summary without saving
    #[arg(long, conflicts_with = "share")]
    pub preview: bool,

    /// Encode as PNG instead of JPEG (download and preview only)
    #[arg(long, conflicts_with = "share")]
    pub png: bool,

    /// Note background color (e.g. #667eea)
    #[arg(long)]
    pub background: Option<Color>,

    /// Text color
    #[arg(long)]
    pub color: Option<Color>,

    /// Font size in pixels
    #[arg(long)]
    pub font_size: Option<f32>,

    /// Bold text
    #[arg(long)]
    pub bold: bool,

    /// Italic text
    #[arg(long)]
    pub italic: bool,

    /// Underlined text
    #[arg(long)]
    pub underline: bool,

    /// Text alignment: left, center or right
    #[arg(long)]
    pub align: Option<TextAlign>,

    /// Append a sticker, by palette index or as literal text (repeatable)
    #[arg(long)]
    pub sticker: Vec<String>,

    /// Capture resolution: high (2x) or normal (1x)
    #[arg(long, default_value = "high")]
    pub quality: ExportQuality,

    /// Directory exported images are saved to
    #[arg(long, short, env = "NOTEPAD_OUT_DIR", default_value = ".")]
    pub out: PathBuf,

    /// JSON configuration file
    #[arg(long, env = "NOTEPAD_CONFIG")]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    /// Style patch for the color, size and alignment flags.
    #[must_use]
    pub fn style_patch(&self) -> StyleAttributes {
        let mut patch = StyleAttributes::new();
        if let Some(bg) = self.background {
            patch.merge(&StyleAttributes::background(bg));
        }
        if let Some(color) = self.color {
            patch.merge(&StyleAttributes::color(color));
        }
        if let Some(px) = self.font_size {
            patch.merge(&StyleAttributes::font_size(px));
        }
        if let Some(align) = self.align {
            patch.merge(&StyleAttributes::align(align));
        }
        patch
    }

    /// Build the session state for `text`.
    #[must_use]
    pub fn to_state(&self, text: &str) -> AppState {
        let mut state = AppState::new();
        state.set_content(text);
        state.apply_style(&self.style_patch());
        if self.bold {
            state.toggle_bold();
        }
        if self.italic {
            state.toggle_italic();
        }
        if self.underline {
            state.toggle_underline();
        }
        for sticker in &self.sticker {
            state.insert_sticker(resolve_sticker(sticker));
        }
        state.set_quality(self.quality);
        state
    }

    /// The note text from the argument, `--input`, or stdin.
    ///
    /// # Errors
    ///
    /// Returns an error if the input file or stdin cannot be read.
    pub async fn read_note(&self) -> anyhow::Result<String> {
        if let Some(text) = &self.text {
            return Ok(text.clone());
        }
        if let Some(path) = &self.input {
            return tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read note from {}", path.display()));
        }
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read note from stdin")?;
        Ok(text)
    }

    /// Gateway configuration from `--config`, or defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load_config(&self) -> anyhow::Result<GatewayConfig> {
        match &self.config {
            Some(path) => GatewayConfig::load(path)
                .await
                .with_context(|| format!("Failed to load config from {}", path.display())),
            None => Ok(GatewayConfig::default()),
        }
    }
}

/// A palette index picks a built-in sticker; anything else is used as-is.
fn resolve_sticker(sticker: &str) -> &str {
    sticker
        .parse::<usize>()
        .ok()
        .and_then(|i| STICKERS.get(i).copied())
        .unwrap_or(sticker)
}

/// "Opens" intent URLs by printing them.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutOpener;

#[async_trait]
impl UrlOpener for StdoutOpener {
    async fn open(&self, url: &Url) -> Result<(), DeliveryError> {
        println!("Open to share: {url}");
        Ok(())
    }
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Saved to this path.
    Saved(PathBuf),
    /// Rendered only.
    Previewed(Preview),
    /// Shared.
    Shared(ShareOutcome),
}

impl RunOutcome {
    /// One-line summary for the terminal.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Saved(path) => format!("Saved {}", path.display()),
            Self::Previewed(preview) => serde_json::json!({
                "format": preview.result.format,
                "width": preview.result.width,
                "height": preview.result.height,
                "mimeType": preview.result.mime_type(),
                "bytes": preview.result.len(),
                "dataUrlLength": preview.data_url.len(),
            })
            .to_string(),
            Self::Shared(ShareOutcome::Shared) => "Shared".to_string(),
            Self::Shared(ShareOutcome::IntentOpened(url)) => format!("Opened {url}"),
            Self::Shared(ShareOutcome::Downloaded(name)) => format!("Saved {name} for sharing"),
        }
    }
}

/// Export or share the note described by `args`.
///
/// # Errors
///
/// Returns an error if the note or config cannot be read, or the export fails.
pub async fn run(args: &CliArgs) -> anyhow::Result<RunOutcome> {
    let config = args.load_config().await?;
    let text = args.read_note().await?;
    let state = args.to_state(&text);

    let downloader = DirectoryDownloader::new(&args.out);
    let capabilities = Capabilities::new(Arc::new(downloader), Arc::new(TracingNotifier))
        .with_url_opener(Arc::new(StdoutOpener));
    let gateway = ExportGateway::new(
        config,
        Box::new(notepad_renderer::SvgRasterizer::new()),
        capabilities,
    );

    tracing::info!(
        "Exporting {} characters as {} ({:?} quality)",
        state.content().char_count(),
        args.format,
        state.quality
    );

    let encoding = if args.png {
        Encoding::Png
    } else {
        gateway.default_encoding()
    };
    let outcome = if let Some(target) = args.share {
        RunOutcome::Shared(gateway.share(&state, args.format, target).await?)
    } else if args.preview {
        RunOutcome::Previewed(gateway.preview_as(&state, args.format, encoding).await?)
    } else {
        let name = gateway.download_as(&state, args.format, encoding).await?;
        RunOutcome::Saved(args.out.join(name))
    };
    Ok(outcome)
}
