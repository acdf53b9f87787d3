//! Error types shared by the recorder components.

use std::error::Error as StdError;
use thiserror::Error;

/// Recorder-wide error type
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0} already closed")]
    WriterClosed(&'static str),

    #[error("Audio capture error: {0}")]
    Audio(#[from] hound::Error),

    #[error("Invalid media format: {0}")]
    InvalidMediaFormat(String),

    #[error("Storage error ({destination}, key {key}): {message}")]
    Storage {
        destination: String,
        key: String,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using RecorderError
pub type Result<T> = std::result::Result<T, RecorderError>;

/// Flatten an error and its source chain into a single line.
///
/// Storage clients tend to produce multi-line messages with nested causes;
/// warnings about failed uploads carry this form instead.
pub fn normalize_error(err: &(dyn StdError + 'static)) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);

    while let Some(e) = current {
        let text = e.to_string().split_whitespace().collect::<Vec<_>>().join(" ");
        if !text.is_empty() && !parts.iter().any(|p| p.contains(&text)) {
            parts.push(text);
        }
        current = e.source();
    }

    if parts.is_empty() {
        "unknown error".to_string()
    } else {
        parts.join(": ")
    }
}
