use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

use crate::sidecar::LogLevels;

/// Configuration shared by every recording a [`Recorder`](super::Recorder) starts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Directory receiving the sidecar and audio files while they are local
    pub output_dir: PathBuf,

    /// Persist/mirror thresholds for log lines
    pub log_levels: LogLevels,

    /// Metadata of the request that opened the session (URL, headers, caller)
    /// Written as the first `request-metadata` entry when present
    pub request_metadata: Option<Value>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("recordings"),
            log_levels: LogLevels::default(),
            request_metadata: None,
        }
    }
}
