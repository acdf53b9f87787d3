use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use super::state::RecordingState;
use crate::audio::AudioCaptureStats;
use crate::storage::UploadReceipt;

/// What happened to one artifact at the end of a recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ArtifactOutcome {
    /// Stored by the primary destination; local copy removed
    Uploaded(UploadReceipt),

    /// No destination configured; file left on local disk
    Retained { path: PathBuf },

    /// Upload failed; file left on local disk
    Failed { path: PathBuf, error: String },
}

impl ArtifactOutcome {
    pub fn is_uploaded(&self) -> bool {
        matches!(self, ArtifactOutcome::Uploaded(_))
    }

    /// Local path still holding the artifact, if any
    pub fn local_path(&self) -> Option<&PathBuf> {
        match self {
            ArtifactOutcome::Uploaded(_) => None,
            ArtifactOutcome::Retained { path } | ArtifactOutcome::Failed { path, .. } => Some(path),
        }
    }
}

/// Summary of a finished recording
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeReport {
    pub recording_id: Uuid,

    /// Terminal state (archived or abandoned)
    pub state: RecordingState,

    /// Sidecar entries written, including the terminal entry
    pub entries: usize,

    pub event_log: ArtifactOutcome,

    /// Present only when media was negotiated
    pub audio: Option<ArtifactOutcome>,

    pub audio_stats: Option<AudioCaptureStats>,
}
