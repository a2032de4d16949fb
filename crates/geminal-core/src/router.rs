//! Stateless routing between windows and their sessions.
//!
//! Both directions are best-effort: a window that has already been torn down
//! is a normal race with asynchronous close, so misses are dropped silently.

use log::{debug, warn};

use crate::registry::{WindowPhase, WindowRegistry};
use crate::surface::{DisplayEvent, WindowId};

/// What happened to a routed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// The window is gone; the message was dropped.
    NoWindow,
    /// The window exists but the collaborator rejected the message. Logged.
    Failed,
}

/// Forward user input from `source` to its session, verbatim and unbuffered.
pub fn route_input(registry: &WindowRegistry, source: WindowId, data: &[u8]) -> Delivery {
    let Some(record) = registry.lookup(source) else {
        debug!("dropping {} input bytes for closed window {source}", data.len());
        return Delivery::NoWindow;
    };

    match record.with_session(|session| session.write(data)) {
        Ok(()) => Delivery::Delivered,
        Err(e) => {
            warn!("window {source}: {e}");
            Delivery::Failed
        }
    }
}

/// Forward a chunk of session output to the window the session belongs to.
pub fn route_output(registry: &WindowRegistry, owner: WindowId, bytes: Vec<u8>) -> Delivery {
    let record = match registry.lookup(owner) {
        Some(r) if r.phase() != WindowPhase::Destroyed => r,
        _ => {
            debug!("dropping {} output bytes for closed window {owner}", bytes.len());
            return Delivery::NoWindow;
        }
    };

    match record.surface().send(&DisplayEvent::Output { data: bytes }) {
        Ok(()) => Delivery::Delivered,
        Err(e) => {
            debug!("window {owner}: output not delivered: {e}");
            Delivery::Failed
        }
    }
}
