use chrono::{DateTime, Utc};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::recorder::Recorder;
use super::registry::{ActiveRecording, RecordingRegistry};
use super::state::RecordingState;
use super::stats::{ArtifactOutcome, FinalizeReport};
use crate::audio::{AudioCaptureFactory, AudioCaptureStats, AudioCaptureWriter, MediaFormat};
use crate::error::{normalize_error, RecorderError, Result};
use crate::sidecar::{EntryKind, EventLogWriter, Severity};
use crate::storage::{storage_key, ArtifactUploader};
use crate::stream::{SessionEvent, StreamSession, Subscription};

struct ActiveCapture {
    writer: Box<dyn AudioCaptureWriter>,
    format: MediaFormat,
}

/// One recording of a live session
///
/// Runs on its own task and consumes the session's events in delivery
/// order, so the event log needs no locking. Owns the event log writer and
/// the audio writer until finalization.
pub struct RecordingSession {
    /// Shared by both artifacts and the registry entry
    recording_id: Uuid,
    /// Partitions the storage keys
    started_at: DateTime<Utc>,
    event_log: EventLogWriter,
    /// Open audio writer, between media negotiation and close
    audio: Option<ActiveCapture>,
    /// Set once media is negotiated; stays set after the writer closes
    audio_path: Option<PathBuf>,
    audio_stats: Option<AudioCaptureStats>,
    capture: Arc<dyn AudioCaptureFactory>,
    /// `None` leaves finished artifacts on local disk
    uploader: Option<ArtifactUploader>,
    registry: Arc<RecordingRegistry>,
    /// Revokes every session channel at once
    subscription: Subscription,
    events: mpsc::UnboundedReceiver<SessionEvent>,
}

impl RecordingSession {
    /// Open the event log, register, subscribe and spawn the event loop
    pub async fn start(recorder: &Recorder, stream: &StreamSession) -> Result<RecordingHandle> {
        let config = recorder.config();
        let recording_id = Uuid::new_v4();
        let started_at = Utc::now();

        info!(
            "Creating recording {} for stream session {}",
            recording_id,
            stream.id()
        );

        tokio::fs::create_dir_all(&config.output_dir).await?;

        let mut event_log =
            EventLogWriter::open(&config.output_dir, &recording_id.to_string(), config.log_levels)
                .await?;

        if let Some(metadata) = &config.request_metadata {
            event_log
                .append(EntryKind::RequestMetadata, metadata.clone())
                .await?;
        }

        event_log
            .log(
                Severity::Info,
                "Recording started",
                json!({ "stream_session": stream.id(), "started_at": started_at.to_rfc3339() }),
            )
            .await?;

        let event_log_path = event_log.path().to_path_buf();
        let registry = Arc::clone(recorder.registry());

        registry.insert(ActiveRecording {
            recording_id,
            started_at,
            event_log_path: event_log_path.clone(),
            audio_path: None,
            state: RecordingState::Created,
        });

        let (subscription, events) = stream.subscribe();
        registry.set_state(&recording_id, RecordingState::Active);

        let session = Self {
            recording_id,
            started_at,
            event_log,
            audio: None,
            audio_path: None,
            audio_stats: None,
            capture: recorder.capture(),
            uploader: recorder.uploader().cloned(),
            registry,
            subscription,
            events,
        };

        let task = tokio::spawn(session.run());

        Ok(RecordingHandle {
            recording_id,
            event_log_path,
            task,
        })
    }

    async fn run(mut self) -> Result<FinalizeReport> {
        while let Some(event) = self.events.recv().await {
            match self.handle(event).await {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => return Err(self.abort(e)),
            }
        }

        self.finalize().await
    }

    /// Apply one event; `Ok(false)` once the session has ended
    async fn handle(&mut self, event: SessionEvent) -> Result<bool> {
        let handled = match event {
            SessionEvent::ServerMessage(message) => {
                self.event_log
                    .append(EntryKind::InboundMessage, message)
                    .await
            }
            SessionEvent::ClientMessage(message) => {
                self.event_log
                    .append(EntryKind::OutboundMessage, message)
                    .await
            }
            SessionEvent::Statistics(sample) => {
                self.event_log
                    .append(EntryKind::StatisticsSample, sample)
                    .await
            }
            SessionEvent::Log {
                severity,
                message,
                fields,
            } => self.event_log.log(severity, &message, fields).await,
            SessionEvent::MediaOpened(format) => self.start_audio(format).await,
            SessionEvent::Audio(samples) => {
                match self.audio.as_mut() {
                    Some(capture) => capture.writer.write(&samples)?,
                    None => debug!(
                        "Dropping {} samples received without negotiated media",
                        samples.len()
                    ),
                }
                Ok(())
            }
            SessionEvent::MediaClosed => self.stop_audio().await,
            SessionEvent::Ended => return Ok(false),
        };

        handled.map(|()| true)
    }

    async fn start_audio(&mut self, format: MediaFormat) -> Result<()> {
        if self.audio_path.is_some() {
            return self
                .event_log
                .log(
                    Severity::Warn,
                    "Media negotiated again; keeping the existing audio capture",
                    json!({ "format": format }),
                )
                .await;
        }

        let path = self.event_log.path().with_extension("wav");
        let writer = match self.capture.start(&path, format) {
            Ok(writer) => writer,
            Err(RecorderError::InvalidMediaFormat(reason)) => {
                return self
                    .event_log
                    .log(
                        Severity::Warn,
                        "Unusable media format; recording without audio",
                        json!({ "format": format, "reason": reason }),
                    )
                    .await;
            }
            Err(e) => return Err(e),
        };

        self.registry.set_audio_path(&self.recording_id, path.clone());
        self.audio_path = Some(path.clone());
        self.audio = Some(ActiveCapture { writer, format });

        self.event_log
            .log(
                Severity::Info,
                "Audio capture started",
                json!({ "path": path, "format": format }),
            )
            .await
    }

    async fn stop_audio(&mut self) -> Result<()> {
        let Some(mut capture) = self.audio.take() else {
            return Ok(());
        };

        let samples = capture.writer.close().await?;
        let stats = AudioCaptureStats::new(samples, &capture.format);
        self.audio_stats = Some(stats);

        let message = format!(
            "Audio capture closed: {} samples, {:.3}s",
            stats.samples, stats.duration_secs
        );
        self.event_log
            .log(Severity::Info, &message, json!(stats))
            .await
    }

    async fn finalize(mut self) -> Result<FinalizeReport> {
        // Revoke before any await so no late event follows the terminal entry.
        self.subscription.dispose();
        self.registry
            .set_state(&self.recording_id, RecordingState::Finalizing);

        let stopped = self.stop_audio().await;
        if let Err(e) = stopped {
            return Err(self.abort(e));
        }

        let event_log_path = self.event_log.path().to_path_buf();

        let closed = match self
            .event_log
            .log(
                Severity::Debug,
                "Finalizing event log",
                json!({ "path": &event_log_path }),
            )
            .await
        {
            Ok(()) => self.event_log.close().await,
            Err(e) => Err(e),
        };
        if let Err(e) = closed {
            return Err(self.abort(e));
        }

        info!(
            "Event log finalized: {} ({} entries)",
            event_log_path.display(),
            self.event_log.entry_count()
        );

        let audio_path = self.audio_path.clone();

        let (state, event_log, audio) = match &self.uploader {
            None => {
                warn!(
                    "No storage destination configured for recording {}; leaving artifacts on local disk: event log {}, audio {}",
                    self.recording_id,
                    event_log_path.display(),
                    audio_path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "none".to_string())
                );
                (
                    RecordingState::Abandoned,
                    ArtifactOutcome::Retained {
                        path: event_log_path,
                    },
                    audio_path.map(|path| ArtifactOutcome::Retained { path }),
                )
            }
            Some(uploader) => {
                let recording_id = self.recording_id.to_string();
                let started_at = self.started_at;
                let audio_upload = async {
                    match &audio_path {
                        Some(path) => {
                            let key = storage_key(&started_at, &recording_id, "wav");
                            Some(archive(uploader, path, &key).await)
                        }
                        None => None,
                    }
                };
                let log_key = storage_key(&started_at, &recording_id, "json");
                let event_log_upload = archive(uploader, &event_log_path, &log_key);

                let (audio, event_log) = tokio::join!(audio_upload, event_log_upload);
                (RecordingState::Archived, event_log, audio)
            }
        };

        self.registry.set_state(&self.recording_id, state);
        self.registry.remove(&self.recording_id);

        info!("Recording {} {}", self.recording_id, state);

        Ok(FinalizeReport {
            recording_id: self.recording_id,
            state,
            entries: self.event_log.entry_count(),
            event_log,
            audio,
            audio_stats: self.audio_stats,
        })
    }

    /// Local I/O failure: the recording cannot be completed in-process
    fn abort(&mut self, e: RecorderError) -> RecorderError {
        self.subscription.dispose();
        error!(
            "Recording {} aborted: {} (partial event log at {})",
            self.recording_id,
            e,
            self.event_log.path().display()
        );
        self.registry.remove(&self.recording_id);
        e
    }
}

/// Upload one artifact; failures become a warning and a `Failed` outcome
async fn archive(uploader: &ArtifactUploader, path: &Path, key: &str) -> ArtifactOutcome {
    match uploader.upload(path, key).await {
        Ok(receipt) => ArtifactOutcome::Uploaded(receipt),
        Err(e) => {
            let message = match &e {
                RecorderError::Storage { message, .. } => message.clone(),
                other => normalize_error(other),
            };
            warn!(
                "Failed to upload {} to {} as {}: {}; local copy kept",
                path.display(),
                uploader.primary_name(),
                key,
                message
            );
            ArtifactOutcome::Failed {
                path: path.to_path_buf(),
                error: message,
            }
        }
    }
}

/// Handle to a running recording
pub struct RecordingHandle {
    recording_id: Uuid,
    event_log_path: PathBuf,
    task: JoinHandle<Result<FinalizeReport>>,
}

impl RecordingHandle {
    pub fn recording_id(&self) -> Uuid {
        self.recording_id
    }

    pub fn event_log_path(&self) -> &Path {
        &self.event_log_path
    }

    /// Expected audio artifact path, should media be negotiated
    pub fn audio_path(&self) -> PathBuf {
        self.event_log_path.with_extension("wav")
    }

    /// Wait for the recording to finish finalization
    pub async fn wait(self) -> Result<FinalizeReport> {
        self.task
            .await
            .map_err(|e| RecorderError::Io(std::io::Error::other(e)))?
    }
}

impl std::fmt::Debug for RecordingHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingHandle")
            .field("recording_id", &self.recording_id)
            .field("event_log_path", &self.event_log_path)
            .finish()
    }
}
