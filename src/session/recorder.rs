use std::sync::Arc;

use super::config::SessionConfig;
use super::registry::RecordingRegistry;
use super::session::{RecordingHandle, RecordingSession};
use crate::audio::{AudioCaptureFactory, WavCaptureFactory};
use crate::error::Result;
use crate::storage::ArtifactUploader;
use crate::stream::StreamSession;

/// Starts recordings and owns what they share
///
/// Holds the registry of in-flight recordings, the audio capture factory and
/// the optional uploader. Cloning is cheap; clones share the registry.
#[derive(Clone)]
pub struct Recorder {
    config: SessionConfig,
    registry: Arc<RecordingRegistry>,
    capture: Arc<dyn AudioCaptureFactory>,
    uploader: Option<ArtifactUploader>,
}

impl Recorder {
    pub fn new(config: SessionConfig, registry: Arc<RecordingRegistry>) -> Self {
        Self {
            config,
            registry,
            capture: Arc::new(WavCaptureFactory),
            uploader: None,
        }
    }

    pub fn with_uploader(mut self, uploader: ArtifactUploader) -> Self {
        self.uploader = Some(uploader);
        self
    }

    pub fn with_capture(mut self, capture: Arc<dyn AudioCaptureFactory>) -> Self {
        self.capture = capture;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<RecordingRegistry> {
        &self.registry
    }

    pub fn uploader(&self) -> Option<&ArtifactUploader> {
        self.uploader.as_ref()
    }

    pub(crate) fn capture(&self) -> Arc<dyn AudioCaptureFactory> {
        Arc::clone(&self.capture)
    }

    /// Start recording `stream`; finalization runs when the stream ends
    pub async fn record(&self, stream: &StreamSession) -> Result<RecordingHandle> {
        RecordingSession::start(self, stream).await
    }
}
