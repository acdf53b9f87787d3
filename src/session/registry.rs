use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

use super::state::RecordingState;

/// Diagnostic view of an in-flight recording
#[derive(Debug, Clone, Serialize)]
pub struct ActiveRecording {
    pub recording_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub event_log_path: PathBuf,
    pub audio_path: Option<PathBuf>,
    pub state: RecordingState,
}

/// Lookup of in-flight recordings by identifier
///
/// Each recording inserts its own entry when it starts and removes it when
/// finalization completes. Backed by `DashMap`, so concurrent recordings
/// never contend on a single lock.
#[derive(Debug, Default)]
pub struct RecordingRegistry {
    active: DashMap<Uuid, ActiveRecording>,
}

impl RecordingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a recording; returns false if the identifier is already present
    pub fn insert(&self, recording: ActiveRecording) -> bool {
        match self.active.entry(recording.recording_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                debug!("Registering recording {}", recording.recording_id);
                slot.insert(recording);
                true
            }
        }
    }

    pub fn set_state(&self, recording_id: &Uuid, state: RecordingState) {
        if let Some(mut entry) = self.active.get_mut(recording_id) {
            entry.state = state;
        }
    }

    pub fn set_audio_path(&self, recording_id: &Uuid, path: PathBuf) {
        if let Some(mut entry) = self.active.get_mut(recording_id) {
            entry.audio_path = Some(path);
        }
    }

    pub fn get(&self, recording_id: &Uuid) -> Option<ActiveRecording> {
        self.active.get(recording_id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, recording_id: &Uuid) -> bool {
        self.active.contains_key(recording_id)
    }

    pub fn remove(&self, recording_id: &Uuid) -> Option<ActiveRecording> {
        debug!("Removing recording {} from registry", recording_id);
        self.active.remove(recording_id).map(|(_, recording)| recording)
    }

    /// Snapshot of every in-flight recording, oldest first
    pub fn list(&self) -> Vec<ActiveRecording> {
        let mut recordings: Vec<ActiveRecording> =
            self.active.iter().map(|entry| entry.value().clone()).collect();
        recordings.sort_by_key(|r| r.started_at);
        recordings
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
