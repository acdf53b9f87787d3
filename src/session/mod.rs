//! Recording session lifecycle
//!
//! This module provides the `RecordingSession` orchestrator that manages:
//! - The sidecar event log, opened as soon as the recording starts
//! - Forwarding of session messages, statistics and log lines into it
//! - The audio capture writer, started once media is negotiated
//! - Finalization and handoff of both artifacts to storage
//! - Registration in the registry of in-flight recordings

mod config;
mod recorder;
mod registry;
mod session;
mod state;
mod stats;

pub use config::SessionConfig;
pub use recorder::Recorder;
pub use registry::{ActiveRecording, RecordingRegistry};
pub use session::{RecordingHandle, RecordingSession};
pub use state::RecordingState;
pub use stats::{ArtifactOutcome, FinalizeReport};
