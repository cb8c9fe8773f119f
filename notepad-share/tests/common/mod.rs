//! Test harness for gateway integration tests.
//!
//! Provides recording fakes for every platform capability and a builder
//! that wires them into an [`ExportGateway`].

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use notepad_core::{AppState, Document, NodeId};
use notepad_renderer::{CapturedImage, RasterOptions, Rasterizer, RenderError, RenderResult};
use notepad_share::{
    Capabilities, DeliveryError, DownloadPrimitive, ExportGateway, GatewayConfig, NativeShare,
    NativeShareError, Notice, NoticeLevel, Notifier, ShareRequest, UrlOpener,
};
use tokio::sync::Notify;
use url::Url;

/// Rasterizer that counts calls and paints a white block.
#[derive(Default)]
pub struct CountingRasterizer {
    pub calls: Arc<AtomicUsize>,
    pub scales: Arc<Mutex<Vec<f32>>>,
    pub fail: bool,
}

impl Rasterizer for CountingRasterizer {
    fn rasterize(
        &self,
        _document: &Document,
        _node: NodeId,
        options: &RasterOptions,
    ) -> RenderResult<CapturedImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.scales.lock().expect("scales").push(options.scale);
        if self.fail {
            return Err(RenderError::RasterizationFailed("GPU lost".to_string()));
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (w, h) = ((600.0 * options.scale) as u32, (200.0 * options.scale) as u32);
        let data = [255u8, 255, 255, 255].repeat((w * h) as usize);
        CapturedImage::from_rgba(w, h, &data)
    }
}

/// Records every notice.
#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Notice> {
        self.notices.lock().expect("notices").clone()
    }

    pub fn errors(&self) -> Vec<Notice> {
        self.all()
            .into_iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().expect("notices").push(notice);
    }
}

/// Keeps downloads in memory.
#[derive(Default)]
pub struct MemoryDownloader {
    pub files: Mutex<Vec<(String, Vec<u8>)>>,
    pub fail: bool,
}

impl MemoryDownloader {
    pub fn names(&self) -> Vec<String> {
        self.files
            .lock()
            .expect("files")
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[async_trait]
impl DownloadPrimitive for MemoryDownloader {
    async fn save(&self, bytes: &[u8], filename: &str) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError::Rejected("disk full".to_string()));
        }
        self.files
            .lock()
            .expect("files")
            .push((filename.to_string(), bytes.to_vec()));
        Ok(())
    }
}

/// Records opened URLs.
#[derive(Default)]
pub struct RecordingOpener {
    pub urls: Mutex<Vec<Url>>,
    pub fail: bool,
}

impl RecordingOpener {
    pub fn opened(&self) -> Vec<Url> {
        self.urls.lock().expect("urls").clone()
    }
}

#[async_trait]
impl UrlOpener for RecordingOpener {
    async fn open(&self, url: &Url) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError::Rejected("popup blocked".to_string()));
        }
        self.urls.lock().expect("urls").push(url.clone());
        Ok(())
    }
}

/// How the fake share sheet responds.
#[derive(Clone)]
pub enum NativeBehaviour {
    Succeed,
    Cancel,
    Unsupported,
    Fail,
    /// Succeed once the notify fires.
    WaitFor(Arc<Notify>),
}

/// Fake platform share sheet.
pub struct MockNativeShare {
    pub files: bool,
    pub behaviour: NativeBehaviour,
    pub requests: Mutex<Vec<ShareRequest>>,
}

impl MockNativeShare {
    pub fn new(files: bool, behaviour: NativeBehaviour) -> Self {
        Self {
            files,
            behaviour,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().expect("requests").len()
    }
}

#[async_trait]
impl NativeShare for MockNativeShare {
    fn can_share_files(&self) -> bool {
        self.files
    }

    async fn share(&self, request: ShareRequest) -> Result<(), NativeShareError> {
        self.requests.lock().expect("requests").push(request);
        match &self.behaviour {
            NativeBehaviour::Succeed => Ok(()),
            NativeBehaviour::Cancel => Err(NativeShareError::Cancelled),
            NativeBehaviour::Unsupported => Err(NativeShareError::Unsupported),
            NativeBehaviour::Fail => Err(NativeShareError::Failed("sheet crashed".to_string())),
            NativeBehaviour::WaitFor(notify) => {
                notify.notified().await;
                Ok(())
            }
        }
    }
}

/// A gateway plus handles on all of its fakes.
pub struct Harness {
    pub gateway: ExportGateway,
    pub captures: Arc<AtomicUsize>,
    pub scales: Arc<Mutex<Vec<f32>>>,
    pub notifier: Arc<RecordingNotifier>,
    pub downloads: Arc<MemoryDownloader>,
    pub opener: Option<Arc<RecordingOpener>>,
    pub native: Option<Arc<MockNativeShare>>,
}

impl Harness {
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder::default()
    }

    pub fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> Vec<Url> {
        self.opener.as_ref().map(|o| o.opened()).unwrap_or_default()
    }

    pub fn native_calls(&self) -> usize {
        self.native.as_ref().map_or(0, |n| n.calls())
    }
}

/// Configures a [`Harness`].
#[derive(Default)]
pub struct HarnessBuilder {
    config: GatewayConfig,
    native: Option<MockNativeShare>,
    opener: Option<RecordingOpener>,
    download_fails: bool,
    raster_fails: bool,
}

impl HarnessBuilder {
    pub fn config(mut self, config: GatewayConfig) -> Self {
        self.config = config;
        self
    }

    pub fn native(mut self, files: bool, behaviour: NativeBehaviour) -> Self {
        self.native = Some(MockNativeShare::new(files, behaviour));
        self
    }

    pub fn opener(mut self) -> Self {
        self.opener = Some(RecordingOpener::default());
        self
    }

    pub fn failing_opener(mut self) -> Self {
        self.opener = Some(RecordingOpener {
            fail: true,
            ..RecordingOpener::default()
        });
        self
    }

    pub fn failing_download(mut self) -> Self {
        self.download_fails = true;
        self
    }

    pub fn failing_rasterizer(mut self) -> Self {
        self.raster_fails = true;
        self
    }

    pub fn build(self) -> Harness {
        let rasterizer = CountingRasterizer {
            fail: self.raster_fails,
            ..CountingRasterizer::default()
        };
        let captures = Arc::clone(&rasterizer.calls);
        let scales = Arc::clone(&rasterizer.scales);

        let notifier = Arc::new(RecordingNotifier::default());
        let downloads = Arc::new(MemoryDownloader {
            fail: self.download_fails,
            ..MemoryDownloader::default()
        });
        let native = self.native.map(Arc::new);
        let opener = self.opener.map(Arc::new);

        let mut caps = Capabilities::new(downloads.clone(), notifier.clone());
        if let Some(native) = &native {
            caps = caps.with_native_share(native.clone());
        }
        if let Some(opener) = &opener {
            caps = caps.with_url_opener(opener.clone());
        }

        Harness {
            gateway: ExportGateway::new(self.config, Box::new(rasterizer), caps),
            captures,
            scales,
            notifier,
            downloads,
            opener,
            native,
        }
    }
}

/// Application state holding `text`.
pub fn note(text: &str) -> AppState {
    let mut state = AppState::new();
    state.set_content(text);
    state
}
