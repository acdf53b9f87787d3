use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tag identifying what a sidecar entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryKind {
    /// Log line produced by the recorder or the session engine
    LifecycleLog,
    /// Protocol message received from the remote peer
    InboundMessage,
    /// Protocol message sent to the remote peer
    OutboundMessage,
    /// Periodic transport/media statistics
    StatisticsSample,
    /// Metadata of the request that opened the session
    RequestMetadata,
    /// Terminal entry written by `close`
    SessionEnd,
}

/// Log severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }
}

/// Minimum severities for persisting into the sidecar and mirroring to `tracing`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLevels {
    /// Lowest severity written into the sidecar
    pub persist: Severity,

    /// Lowest severity forwarded to the application log
    pub mirror: Severity,
}

impl Default for LogLevels {
    fn default() -> Self {
        Self {
            persist: Severity::Debug,
            mirror: Severity::Info,
        }
    }
}

/// Header object written once at the top of the sidecar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SidecarHeader {
    /// RFC 3339 wall-clock creation time
    pub timestamp: String,
    /// Recording identifier
    pub id: String,
}

/// One record in the sidecar `body` array
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SidecarEntry {
    /// Seconds since the log was opened
    pub timestamp: f64,

    #[serde(rename = "type")]
    pub kind: EntryKind,

    pub data: Value,
}

/// A closed sidecar file, as read back for inspection or replay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SidecarDocument {
    pub header: SidecarHeader,
    pub body: Vec<SidecarEntry>,
}
