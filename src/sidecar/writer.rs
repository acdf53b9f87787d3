use chrono::Utc;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, error, info, trace, warn};

use super::entry::{EntryKind, LogLevels, Severity, SidecarEntry, SidecarHeader};
use crate::error::{RecorderError, Result};

/// Streaming writer for one recording's sidecar file
///
/// The file is opened immediately and every entry is flushed as it is
/// appended, so an interrupted recording leaves a valid prefix on disk:
///
/// ```json
/// {"header":{"timestamp":"2025-10-28T14:30:00+00:00","id":"3f2a..."},"body":[
/// {"timestamp":0.000412,"type":"request-metadata","data":{...}}
/// ,{"timestamp":1.204113,"type":"statistics-sample","data":{...}}
/// ,{"timestamp":9.870001,"type":"session-end","data":{"entries":2}}
/// ]}
/// ```
///
/// Only a closed file ends with the `]}` footer. Appends must be serialized
/// by the caller; the recording session does this by driving the writer from
/// a single task.
pub struct EventLogWriter {
    path: PathBuf,
    recording_id: String,
    levels: LogLevels,
    writer: Option<BufWriter<File>>,
    opened_at: Instant,
    last_timestamp: f64,
    entries: usize,
}

impl EventLogWriter {
    /// Create `{dir}/{recording_id}.json` and write the header
    pub async fn open(dir: impl AsRef<Path>, recording_id: &str, levels: LogLevels) -> Result<Self> {
        let path = dir.as_ref().join(format!("{}.json", recording_id));

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        let mut writer = BufWriter::new(file);

        let header = SidecarHeader {
            timestamp: Utc::now().to_rfc3339(),
            id: recording_id.to_string(),
        };

        let mut prefix = b"{\"header\":".to_vec();
        serde_json::to_writer(&mut prefix, &header)?;
        prefix.extend_from_slice(b",\"body\":[\n");

        writer.write_all(&prefix).await?;
        writer.flush().await?;

        debug!("Opened event log: {}", path.display());

        Ok(Self {
            path,
            recording_id: recording_id.to_string(),
            levels,
            writer: Some(writer),
            opened_at: Instant::now(),
            last_timestamp: 0.0,
            entries: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries written so far, including the terminal entry once closed
    pub fn entry_count(&self) -> usize {
        self.entries
    }

    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }

    /// Append one entry stamped with the time since `open`
    pub async fn append(&mut self, kind: EntryKind, data: Value) -> Result<()> {
        if self.writer.is_none() {
            return Err(RecorderError::WriterClosed("event log writer"));
        }

        let entry = SidecarEntry {
            timestamp: self.relative_timestamp(),
            kind,
            data,
        };

        let mut line = Vec::with_capacity(128);
        if self.entries > 0 {
            line.push(b',');
        }
        serde_json::to_writer(&mut line, &entry)?;
        line.push(b'\n');

        let writer = self
            .writer
            .as_mut()
            .ok_or(RecorderError::WriterClosed("event log writer"))?;
        writer.write_all(&line).await?;
        writer.flush().await?;

        self.entries += 1;

        Ok(())
    }

    /// Record a log line
    ///
    /// Mirrored to the application log at `levels.mirror` and above, persisted
    /// as a `lifecycle-log` entry at `levels.persist` and above.
    pub async fn log(&mut self, severity: Severity, message: &str, fields: Value) -> Result<()> {
        if self.writer.is_none() {
            return Err(RecorderError::WriterClosed("event log writer"));
        }

        if severity >= self.levels.mirror {
            mirror(severity, &self.recording_id, message);
        }

        if severity >= self.levels.persist {
            let mut data = json!({
                "level": severity.as_str(),
                "message": message,
            });
            if !fields.is_null() {
                data["fields"] = fields;
            }
            self.append(EntryKind::LifecycleLog, data).await?;
        }

        Ok(())
    }

    /// Write the terminal entry and footer, then flush and sync the file
    pub async fn close(&mut self) -> Result<()> {
        let appended = self.entries;
        self.append(EntryKind::SessionEnd, json!({ "entries": appended }))
            .await?;

        let mut writer = self
            .writer
            .take()
            .ok_or(RecorderError::WriterClosed("event log writer"))?;

        writer.write_all(b"]}\n").await?;
        writer.flush().await?;

        let file = writer.into_inner();
        file.sync_all().await?;

        debug!(
            "Closed event log: {} ({} entries)",
            self.path.display(),
            appended + 1
        );

        Ok(())
    }

    fn relative_timestamp(&mut self) -> f64 {
        let elapsed = self.opened_at.elapsed().as_secs_f64();
        // Instant is monotonic; the clamp keeps rounding from ever going backwards.
        if elapsed > self.last_timestamp {
            self.last_timestamp = elapsed;
        }
        self.last_timestamp
    }
}

fn mirror(severity: Severity, recording_id: &str, message: &str) {
    match severity {
        Severity::Trace => trace!(recording_id, "{}", message),
        Severity::Debug => debug!(recording_id, "{}", message),
        Severity::Info => info!(recording_id, "{}", message),
        Severity::Warn => warn!(recording_id, "{}", message),
        Severity::Error => error!(recording_id, "{}", message),
    }
}
