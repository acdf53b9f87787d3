use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

use super::events::SessionEvent;
use crate::audio::MediaFormat;
use crate::sidecar::Severity;

type Subscribers = Vec<(u64, mpsc::UnboundedSender<SessionEvent>)>;

struct Inner {
    session_id: String,
    next_subscriber: AtomicU64,
    ended: AtomicBool,
    subscribers: Mutex<Subscribers>,
}

impl Inner {
    fn subscribers(&self) -> MutexGuard<'_, Subscribers> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Event fan-out for one live streaming session
///
/// The session engine drives this handle; recorders subscribe to it. Every
/// subscriber receives events on its own ordered channel, so a consumer
/// processing its receiver from one task sees them in emission order.
#[derive(Clone)]
pub struct StreamSession {
    inner: Arc<Inner>,
}

impl StreamSession {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                session_id: session_id.into(),
                next_subscriber: AtomicU64::new(0),
                ended: AtomicBool::new(false),
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.session_id
    }

    pub fn is_ended(&self) -> bool {
        self.inner.ended.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers().len()
    }

    /// Register for every event channel of this session
    ///
    /// Dropping or disposing the returned [`Subscription`] revokes all of
    /// them at once; the receiver then drains and yields `None`.
    pub fn subscribe(&self) -> (Subscription, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.inner.next_subscriber.fetch_add(1, Ordering::SeqCst);

        if self.is_ended() {
            // Late subscribers still observe the termination.
            let _ = tx.send(SessionEvent::Ended);
        } else {
            self.inner.subscribers().push((id, tx));
        }

        let subscription = Subscription {
            id,
            hub: Arc::downgrade(&self.inner),
            disposed: false,
        };

        (subscription, rx)
    }

    pub fn client_message(&self, message: Value) {
        self.emit(SessionEvent::ClientMessage(message));
    }

    pub fn server_message(&self, message: Value) {
        self.emit(SessionEvent::ServerMessage(message));
    }

    pub fn statistics(&self, sample: Value) {
        self.emit(SessionEvent::Statistics(sample));
    }

    pub fn media_opened(&self, format: MediaFormat) {
        self.emit(SessionEvent::MediaOpened(format));
    }

    pub fn audio(&self, samples: Vec<i16>) {
        self.emit(SessionEvent::Audio(samples));
    }

    pub fn media_closed(&self) {
        self.emit(SessionEvent::MediaClosed);
    }

    /// Logger entry point for the session engine
    ///
    /// Lines go to every subscribed recording, which persists and mirrors
    /// them according to its levels. With no subscriber the line goes
    /// straight to the application log.
    pub fn log(&self, severity: Severity, message: impl Into<String>, fields: Value) {
        let message = message.into();

        if self.subscriber_count() == 0 {
            let session_id = self.id();
            match severity {
                Severity::Trace => trace!(session_id, "{}", message),
                Severity::Debug => debug!(session_id, "{}", message),
                Severity::Info => info!(session_id, "{}", message),
                Severity::Warn => warn!(session_id, "{}", message),
                Severity::Error => error!(session_id, "{}", message),
            }
            return;
        }

        self.emit(SessionEvent::Log {
            severity,
            message,
            fields,
        });
    }

    /// Signal termination; subscribers receive `Ended` and are released
    pub fn end(&self) {
        if self.inner.ended.swap(true, Ordering::SeqCst) {
            return;
        }

        let subscribers = std::mem::take(&mut *self.inner.subscribers());
        for (_, tx) in subscribers {
            let _ = tx.send(SessionEvent::Ended);
        }

        debug!("Stream session {} ended", self.id());
    }

    fn emit(&self, event: SessionEvent) {
        if self.is_ended() {
            debug!("Dropping event after end of session {}", self.id());
            return;
        }

        let mut subscribers = self.inner.subscribers();
        subscribers.retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }
}

/// Revocation handle for one subscriber's channels
pub struct Subscription {
    id: u64,
    hub: Weak<Inner>,
    disposed: bool,
}

impl Subscription {
    /// Revoke every channel of this subscriber; idempotent
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        if let Some(hub) = self.hub.upgrade() {
            hub.subscribers().retain(|(id, _)| *id != self.id);
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}
