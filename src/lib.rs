pub mod audio;
pub mod config;
pub mod error;
pub mod session;
pub mod sidecar;
pub mod storage;
pub mod stream;

pub use audio::{
    AudioCaptureFactory, AudioCaptureStats, AudioCaptureWriter, MediaFormat, SampleFormat,
    WavCapture, WavCaptureFactory,
};
pub use config::Config;
pub use error::{RecorderError, Result};
pub use session::{
    ActiveRecording, ArtifactOutcome, FinalizeReport, Recorder, RecordingHandle,
    RecordingRegistry, RecordingSession, RecordingState, SessionConfig,
};
pub use sidecar::{EntryKind, EventLogWriter, LogLevels, Severity, SidecarDocument, SidecarEntry};
pub use storage::{storage_key, ArtifactUploader, LocalDirectoryBackend, StorageBackend, UploadReceipt};
pub use stream::{SessionEvent, StreamSession, Subscription};
