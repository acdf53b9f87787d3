//! Artifact handoff to long-term storage

mod backend;
mod uploader;

pub use backend::{LocalDirectoryBackend, StorageBackend};
pub use uploader::{upload_to, ArtifactUploader, UploadReceipt};

use chrono::{DateTime, Utc};

/// Object key for an artifact: `{YYYY-MM-DD}/{recording_id}.{extension}`
///
/// The date comes from the recording's start time so artifacts are
/// partitioned by day.
pub fn storage_key(start_time: &DateTime<Utc>, recording_id: &str, extension: &str) -> String {
    format!(
        "{}/{}.{}",
        start_time.format("%Y-%m-%d"),
        recording_id,
        extension
    )
}
