//! Export and share operations.
//!
//! Every operation follows the same shape: take the exporting flag (or
//! return [`ExportError::Busy`]), check the note has content, render, then
//! deliver. Failures become one notice through the [`Notifier`] and a typed
//! error for the caller.
//!
//! [`Notifier`]: crate::platform::Notifier

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use notepad_core::AppState;
use notepad_renderer::{
    Encoding, ExportFormat, ExportResult, NoteExporter, Rasterizer, SvgRasterizer,
};
use url::Url;

use crate::config::{GatewayConfig, ShareConfig};
use crate::error::{ExportError, GatewayResult};
use crate::platform::{Capabilities, NativeShareError, Notice, ShareRequest, SharedFile};
use crate::sharer::{CancelPolicy, ShareTarget, Sharer};

/// A rendered export held for display before the user decides what to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    /// The encoded image.
    pub result: ExportResult,
    /// `data:` URL of the image.
    pub data_url: String,
}

impl Preview {
    fn new(result: ExportResult) -> Self {
        let data_url = result.to_data_url();
        Self { result, data_url }
    }
}

/// How a share was delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    /// The platform share sheet took the image.
    Shared,
    /// The target's web intent was opened.
    IntentOpened(Url),
    /// The image was saved for the user to attach by hand.
    Downloaded(String),
}

/// Runs exports and shares against platform capabilities.
#[derive(Debug)]
pub struct ExportGateway {
    exporter: NoteExporter,
    capabilities: Capabilities,
    sharer: Sharer,
    share: ShareConfig,
}

impl ExportGateway {
    /// Create a gateway. The share chain's first step is probed here.
    #[must_use]
    pub fn new(
        config: GatewayConfig,
        rasterizer: Box<dyn Rasterizer>,
        capabilities: Capabilities,
    ) -> Self {
        let sharer = Sharer::probe(&capabilities);
        tracing::debug!("Share chain starts at {sharer} ({capabilities:?})");
        Self {
            exporter: NoteExporter::new(config.export, rasterizer),
            capabilities,
            sharer,
            share: config.share,
        }
    }

    /// Create a gateway with default configuration and the SVG rasterizer.
    #[must_use]
    pub fn with_defaults(capabilities: Capabilities) -> Self {
        Self::new(
            GatewayConfig::default(),
            Box::new(SvgRasterizer::new()),
            capabilities,
        )
    }

    /// First step of the share chain on this platform.
    #[must_use]
    pub fn sharer(&self) -> Sharer {
        self.sharer
    }

    /// Encoding used by [`download`](Self::download), [`preview`](Self::preview)
    /// and [`share`](Self::share).
    #[must_use]
    pub fn default_encoding(&self) -> Encoding {
        self.exporter.default_encoding()
    }

    /// Render the note and save it as `notepad-{format}-{millis}.jpg`.
    ///
    /// Returns the file name.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Busy`] if an export is running, and otherwise
    /// any validation, render or delivery error.
    pub async fn download(&self, state: &AppState, format: ExportFormat) -> GatewayResult<String> {
        self.download_as(state, format, self.exporter.default_encoding())
            .await
    }

    /// Like [`download`](Self::download), with an explicit encoding. The
    /// file extension follows the encoding.
    ///
    /// # Errors
    ///
    /// Same as [`download`](Self::download).
    pub async fn download_as(
        &self,
        state: &AppState,
        format: ExportFormat,
        encoding: Encoding,
    ) -> GatewayResult<String> {
        let Some(_guard) = state.exporting().try_acquire() else {
            return Err(busy());
        };
        let outcome = self.render_and_save(state, format, encoding).await;
        self.report("download", outcome)
    }

    /// Render the note without delivering it.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Busy`] if an export is running, and otherwise
    /// any validation or render error.
    pub async fn preview(&self, state: &AppState, format: ExportFormat) -> GatewayResult<Preview> {
        self.preview_as(state, format, self.exporter.default_encoding())
            .await
    }

    /// Like [`preview`](Self::preview), with an explicit encoding.
    ///
    /// # Errors
    ///
    /// Same as [`preview`](Self::preview).
    #[allow(clippy::unused_async)]
    pub async fn preview_as(
        &self,
        state: &AppState,
        format: ExportFormat,
        encoding: Encoding,
    ) -> GatewayResult<Preview> {
        let Some(_guard) = state.exporting().try_acquire() else {
            return Err(busy());
        };
        let outcome = self.render(state, format, encoding).map(Preview::new);
        self.report("preview", outcome)
    }

    /// Save a previously rendered preview.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Busy`] if an export is running, and otherwise
    /// any delivery error.
    pub async fn download_preview(
        &self,
        state: &AppState,
        preview: &Preview,
    ) -> GatewayResult<String> {
        let Some(_guard) = state.exporting().try_acquire() else {
            return Err(busy());
        };
        let outcome = self.save(&preview.result).await;
        self.report("download preview", outcome)
    }

    /// Share a previously rendered preview.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Busy`] if an export is running, and otherwise
    /// [`ExportError::ShareUnavailable`] when every share step fails.
    pub async fn share_preview(
        &self,
        state: &AppState,
        preview: &Preview,
        target: ShareTarget,
    ) -> GatewayResult<ShareOutcome> {
        let Some(_guard) = state.exporting().try_acquire() else {
            return Err(busy());
        };
        let outcome = self.deliver_share(&preview.result, target).await;
        self.report("share preview", outcome)
    }

    /// Render the note and share it to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Busy`] if an export is running, and otherwise
    /// any validation or render error, or [`ExportError::ShareUnavailable`]
    /// when every share step fails.
    pub async fn share(
        &self,
        state: &AppState,
        format: ExportFormat,
        target: ShareTarget,
    ) -> GatewayResult<ShareOutcome> {
        let Some(_guard) = state.exporting().try_acquire() else {
            return Err(busy());
        };
        let outcome = self.render_and_share(state, format, target).await;
        self.report("share", outcome)
    }

    fn render(
        &self,
        state: &AppState,
        format: ExportFormat,
        encoding: Encoding,
    ) -> GatewayResult<ExportResult> {
        if state.content().is_blank() {
            return Err(ExportError::EmptyContent);
        }
        let scale = state.quality.scale();
        tracing::debug!("Rendering {format} at {scale}x as {encoding}");
        Ok(self
            .exporter
            .export_as(state.view(), state.style(), format, scale, encoding)?)
    }

    async fn render_and_save(
        &self,
        state: &AppState,
        format: ExportFormat,
        encoding: Encoding,
    ) -> GatewayResult<String> {
        let result = self.render(state, format, encoding)?;
        self.save(&result).await
    }

    async fn render_and_share(
        &self,
        state: &AppState,
        format: ExportFormat,
        target: ShareTarget,
    ) -> GatewayResult<ShareOutcome> {
        let result = self.render(state, format, self.exporter.default_encoding())?;
        self.deliver_share(&result, target).await
    }

    async fn save(&self, result: &ExportResult) -> GatewayResult<String> {
        let filename = export_filename(result);
        self.capabilities
            .download
            .save(&result.bytes, &filename)
            .await?;
        self.capabilities
            .notifier
            .notify(Notice::success(format!("Saved {filename}")));
        Ok(filename)
    }

    async fn deliver_share(
        &self,
        result: &ExportResult,
        target: ShareTarget,
    ) -> GatewayResult<ShareOutcome> {
        for step in self.sharer.chain() {
            if !step.applies_to(target, &self.capabilities) {
                tracing::debug!("Skipping {step} for {target}");
                continue;
            }
            match self.try_step(step, result, target).await {
                Ok(outcome) => {
                    tracing::info!("Shared to {target} via {step}");
                    return Ok(outcome);
                }
                Err(StepFailure::Stop) => return Err(ExportError::ShareCancelledByUser),
                Err(StepFailure::Next(reason)) => {
                    tracing::warn!("{step} failed for {target}, falling back: {reason}");
                }
            }
        }
        Err(ExportError::ShareUnavailable)
    }

    async fn try_step(
        &self,
        step: Sharer,
        result: &ExportResult,
        target: ShareTarget,
    ) -> Result<ShareOutcome, StepFailure> {
        match step {
            Sharer::NativeShare => {
                let native = self
                    .capabilities
                    .native_share
                    .as_ref()
                    .ok_or_else(|| StepFailure::Next("no share sheet".to_string()))?;
                let request = ShareRequest {
                    files: vec![SharedFile {
                        name: shared_file_name(&self.share.file_name, result),
                        mime_type: result.mime_type().to_string(),
                        bytes: result.bytes.clone(),
                    }],
                    title: self.share.title.clone(),
                    text: self.share.text.clone(),
                };
                match native.share(request).await {
                    Ok(()) => Ok(ShareOutcome::Shared),
                    Err(NativeShareError::Cancelled)
                        if self.share.cancel_policy == CancelPolicy::Stop =>
                    {
                        tracing::debug!("Share sheet dismissed, stopping");
                        Err(StepFailure::Stop)
                    }
                    Err(e) => Err(StepFailure::Next(e.to_string())),
                }
            }
            Sharer::WebIntentFallback => {
                let opener = self
                    .capabilities
                    .url_opener
                    .as_ref()
                    .ok_or_else(|| StepFailure::Next("no URL opener".to_string()))?;
                let url = target
                    .intent_url(&self.share.text, self.share.page_url.as_deref())
                    .ok_or_else(|| StepFailure::Next(format!("{target} has no intent")))?;
                opener
                    .open(&url)
                    .await
                    .map_err(|e| StepFailure::Next(e.to_string()))?;
                Ok(ShareOutcome::IntentOpened(url))
            }
            Sharer::DownloadFallback => {
                let filename = export_filename(result);
                self.capabilities
                    .download
                    .save(&result.bytes, &filename)
                    .await
                    .map_err(|e| StepFailure::Next(e.to_string()))?;
                self.capabilities.notifier.notify(Notice::info(format!(
                    "Saved {filename}. Open {} and attach it to share your note.",
                    target.display_name()
                )));
                Ok(ShareOutcome::Downloaded(filename))
            }
        }
    }

    fn report<T>(&self, operation: &str, outcome: GatewayResult<T>) -> GatewayResult<T> {
        if let Err(e) = &outcome {
            match e.notice() {
                Some(notice) => {
                    tracing::error!("{operation} failed: {e}");
                    self.capabilities.notifier.notify(notice);
                }
                None => tracing::debug!("{operation} ended quietly: {e}"),
            }
        }
        outcome
    }
}

/// Why a share step did not deliver.
enum StepFailure {
    /// Try the next step.
    Next(String),
    /// End the chain without a notice.
    Stop,
}

fn busy() -> ExportError {
    tracing::debug!("Export already in progress, ignoring request");
    ExportError::Busy
}

fn export_filename(result: &ExportResult) -> String {
    format!(
        "notepad-{}-{}.{}",
        result.format,
        unique_timestamp(),
        result.extension()
    )
}

/// The configured share file name with the extension of the encoding.
fn shared_file_name(configured: &str, result: &ExportResult) -> String {
    Path::new(configured)
        .with_extension(result.extension())
        .to_string_lossy()
        .into_owned()
}

/// Current millis, bumped past the last value handed out so no two calls in
/// this process return the same stamp.
fn unique_timestamp() -> u64 {
    static LAST: AtomicU64 = AtomicU64::new(0);
    let now = current_timestamp();
    let prev = LAST
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last.saturating_add(1)))
        })
        .unwrap_or_else(|last| last);
    now.max(prev.saturating_add(1))
}

/// Milliseconds since the Unix epoch.
#[allow(clippy::cast_possible_truncation)]
fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(encoding: Encoding) -> ExportResult {
        ExportResult {
            bytes: vec![0xFF, 0xD8],
            encoding,
            width: 1080,
            height: 1920,
            format: ExportFormat::Story,
        }
    }

    #[test]
    fn test_export_filename() {
        let result = sample(Encoding::default());
        let name = export_filename(&result);
        assert!(name.starts_with("notepad-story-"));
        assert!(name.ends_with(".jpg"));
        let millis = &name["notepad-story-".len()..name.len() - 4];
        assert!(millis.parse::<u64>().expect("millis") > 0);
    }

    #[test]
    fn test_export_filenames_are_unique() {
        let result = sample(Encoding::default());
        let names: std::collections::HashSet<String> =
            (0..500).map(|_| export_filename(&result)).collect();
        assert_eq!(names.len(), 500);

        let stamps: Vec<u64> = (0..100).map(|_| unique_timestamp()).collect();
        assert!(stamps.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_png_names() {
        let png = sample(Encoding::Png);
        assert!(export_filename(&png).ends_with(".png"));
        assert_eq!(shared_file_name("note.jpg", &png), "note.png");
        assert_eq!(shared_file_name("note", &sample(Encoding::default())), "note.jpg");
    }
}
