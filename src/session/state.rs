use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of one recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// Event log opened and registered
    Created,
    /// Subscribed and receiving session events
    Active,
    /// Writers closing, artifacts being handed off
    Finalizing,
    /// Handoff to storage attempted
    Archived,
    /// No storage configured; artifacts left on local disk
    Abandoned,
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordingState::Created => "created",
            RecordingState::Active => "active",
            RecordingState::Finalizing => "finalizing",
            RecordingState::Archived => "archived",
            RecordingState::Abandoned => "abandoned",
        };
        f.write_str(name)
    }
}
