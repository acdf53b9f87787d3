use serde_json::Value;

use crate::audio::MediaFormat;
use crate::sidecar::Severity;

/// Event delivered by a live streaming session to its subscribers
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Protocol message sent by this side of the session
    ClientMessage(Value),
    /// Protocol message received from the remote peer
    ServerMessage(Value),
    /// Transport/media statistics sample
    Statistics(Value),
    /// Media negotiated; audio frames follow in this format
    MediaOpened(MediaFormat),
    /// Interleaved audio samples in the negotiated format
    Audio(Vec<i16>),
    /// Media stream closed
    MediaClosed,
    /// Log line from the session engine
    Log {
        severity: Severity,
        message: String,
        fields: Value,
    },
    /// Session terminated; nothing follows
    Ended,
}
