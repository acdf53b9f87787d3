//! Sidecar event log
//!
//! One append-only JSON document per recording capturing protocol messages,
//! statistics samples and log lines with timestamps relative to when the
//! log was opened.

mod entry;
mod writer;

pub use entry::{EntryKind, LogLevels, Severity, SidecarDocument, SidecarEntry, SidecarHeader};
pub use writer::EventLogWriter;
