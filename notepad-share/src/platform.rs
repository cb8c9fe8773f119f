//! Platform capabilities the gateway delivers through.
//!
//! Each capability is a trait so hosts can plug in what their platform
//! offers. Only [`DownloadPrimitive`] and [`Notifier`] are mandatory.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Severity of a user notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Neutral information or instructions.
    Info,
    /// An operation completed.
    Success,
    /// An operation failed.
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Text to show.
    pub message: String,
}

impl Notice {
    /// Informational notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// Success notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// Error notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A file attached to a native share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedFile {
    /// File name shown to the receiving app.
    pub name: String,
    /// MIME type.
    pub mime_type: String,
    /// Contents.
    pub bytes: Vec<u8>,
}

/// Payload for the native share sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    /// Attached files.
    pub files: Vec<SharedFile>,
    /// Share title.
    pub title: String,
    /// Share text.
    pub text: String,
}

/// Why a native share did not happen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NativeShareError {
    /// The user dismissed the share sheet.
    #[error("Share cancelled by user")]
    Cancelled,

    /// The platform cannot share this payload.
    #[error("Native share unsupported")]
    Unsupported,

    /// The platform reported a failure.
    #[error("Native share failed: {0}")]
    Failed(String),
}

/// Failure of a download or URL-open delivery.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Writing the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file name is not a plain file name.
    #[error("Invalid file name: {0}")]
    InvalidFilename(String),

    /// The platform refused the delivery.
    #[error("Delivery rejected: {0}")]
    Rejected(String),
}

/// The platform share sheet.
#[async_trait]
pub trait NativeShare: Send + Sync {
    /// Whether files can be attached to a share.
    fn can_share_files(&self) -> bool;

    /// Present the share sheet and wait for the user.
    async fn share(&self, request: ShareRequest) -> Result<(), NativeShareError>;
}

/// Opens a URL in a new browsing context.
#[async_trait]
pub trait UrlOpener: Send + Sync {
    /// Open `url`.
    async fn open(&self, url: &Url) -> Result<(), DeliveryError>;
}

/// Saves bytes as a user-visible file.
#[async_trait]
pub trait DownloadPrimitive: Send + Sync {
    /// Save `bytes` under `filename`. An existing file is never replaced.
    async fn save(&self, bytes: &[u8], filename: &str) -> Result<(), DeliveryError>;
}

/// Shows notices to the user.
pub trait Notifier: Send + Sync {
    /// Show `notice`.
    fn notify(&self, notice: Notice);
}

/// Downloads into a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirectoryDownloader {
    dir: PathBuf,
}

impl DirectoryDownloader {
    /// Save files into `dir`, creating it on first use.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl DownloadPrimitive for DirectoryDownloader {
    async fn save(&self, bytes: &[u8], filename: &str) -> Result<(), DeliveryError> {
        let plain = Path::new(filename)
            .file_name()
            .is_some_and(|name| name == filename);
        if !plain {
            return Err(DeliveryError::InvalidFilename(filename.to_string()));
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(filename);
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        tracing::info!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}

/// Logs notices through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => tracing::info!(notice = %notice, "Notice"),
            NoticeLevel::Success => tracing::info!(notice = %notice, "Success"),
            NoticeLevel::Error => tracing::error!(notice = %notice, "Error"),
        }
    }
}

/// What the host platform can do.
#[derive(Clone)]
pub struct Capabilities {
    /// Native share sheet, if the platform has one.
    pub native_share: Option<Arc<dyn NativeShare>>,
    /// URL opener, if the platform can open links.
    pub url_opener: Option<Arc<dyn UrlOpener>>,
    /// File download.
    pub download: Arc<dyn DownloadPrimitive>,
    /// User notices.
    pub notifier: Arc<dyn Notifier>,
}

impl Capabilities {
    /// Download and notices only.
    #[must_use]
    pub fn new(download: Arc<dyn DownloadPrimitive>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            native_share: None,
            url_opener: None,
            download,
            notifier,
        }
    }

    /// Add a native share sheet.
    #[must_use]
    pub fn with_native_share(mut self, native: Arc<dyn NativeShare>) -> Self {
        self.native_share = Some(native);
        self
    }

    /// Add a URL opener.
    #[must_use]
    pub fn with_url_opener(mut self, opener: Arc<dyn UrlOpener>) -> Self {
        self.url_opener = Some(opener);
        self
    }

    /// Whether the native share sheet can take files.
    #[must_use]
    pub fn native_file_share(&self) -> bool {
        self.native_share
            .as_ref()
            .is_some_and(|native| native.can_share_files())
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("native_share", &self.native_share.is_some())
            .field("url_opener", &self.url_opener.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_directory_downloader_writes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let downloader = DirectoryDownloader::new(dir.path().join("out"));

        downloader
            .save(b"jpeg", "notepad-post-1.jpg")
            .await
            .expect("save");
        let written = std::fs::read(dir.path().join("out/notepad-post-1.jpg")).expect("read");
        assert_eq!(written, b"jpeg");
    }

    #[tokio::test]
    async fn test_directory_downloader_keeps_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let downloader = DirectoryDownloader::new(dir.path());

        downloader.save(b"first", "note.jpg").await.expect("save");
        let err = downloader
            .save(b"second", "note.jpg")
            .await
            .expect_err("already exists");
        assert!(matches!(err, DeliveryError::Io(ref e) if e.kind() == std::io::ErrorKind::AlreadyExists));
        assert_eq!(std::fs::read(dir.path().join("note.jpg")).expect("read"), b"first");
    }

    #[tokio::test]
    async fn test_directory_downloader_rejects_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let downloader = DirectoryDownloader::new(dir.path());

        for name in ["../escape.jpg", "a/b.jpg", "", ".."] {
            let err = downloader.save(b"x", name).await.expect_err(name);
            assert!(matches!(err, DeliveryError::InvalidFilename(_)), "{name}");
        }
    }

    #[test]
    fn test_capabilities_without_native_share() {
        let caps = Capabilities::new(
            Arc::new(DirectoryDownloader::new(".")),
            Arc::new(TracingNotifier),
        );
        assert!(!caps.native_file_share());
        assert!(format!("{caps:?}").contains("native_share: false"));
    }
}
