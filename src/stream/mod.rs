//! Interface to the live streaming session engine
//!
//! The engine negotiating the audio stream lives elsewhere; this module is
//! the boundary it talks through. It emits protocol messages, statistics,
//! media lifecycle and log lines, and recorders subscribe to them.

mod events;
mod hub;

pub use events::SessionEvent;
pub use hub::{StreamSession, Subscription};
