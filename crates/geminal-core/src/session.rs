//! Shell-session collaborator and the event channel sessions report on.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::SessionError;
use crate::surface::WindowId;

/// Terminal grid size in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalSize {
    pub cols: u16,
    pub rows: u16,
}

impl TerminalSize {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }
}

/// What to run inside a new session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellCommand {
    /// Program to launch. `None` means the user's default shell.
    pub program: Option<String>,
    /// Working directory. `None` means the user's home directory.
    pub working_dir: Option<PathBuf>,
    /// Value of `TERM` in the session's environment.
    pub term: String,
}

/// Output and exit notifications from a session, tagged with the window the
/// session was bound to at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Data { window: WindowId, bytes: Vec<u8> },
    /// The session's output stream reached end-of-stream.
    Exit { window: WindowId },
}

impl SessionEvent {
    pub fn window(&self) -> WindowId {
        match self {
            SessionEvent::Data { window, .. } | SessionEvent::Exit { window } => *window,
        }
    }
}

pub type SessionEventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

/// Sending half handed to a session when its output is subscribed.
///
/// Carries the stable window association, so routing never has to resolve a
/// session back to its window by address.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    window: WindowId,
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionEvents {
    pub fn new(window: WindowId, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { window, tx }
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    /// Report a chunk of output. Returns `false` once the event loop is gone.
    pub fn data(&self, bytes: Vec<u8>) -> bool {
        self.tx
            .send(SessionEvent::Data {
                window: self.window,
                bytes,
            })
            .is_ok()
    }

    /// Report end-of-stream. Returns `false` once the event loop is gone.
    pub fn exit(&self) -> bool {
        self.tx
            .send(SessionEvent::Exit {
                window: self.window,
            })
            .is_ok()
    }
}

/// One live shell process and its byte stream.
pub trait SessionHandle: Send {
    /// Start delivering output to `events`. Called exactly once, after the
    /// owning window is registered.
    fn subscribe(&mut self, events: SessionEvents) -> Result<(), SessionError>;

    fn write(&mut self, data: &[u8]) -> Result<(), SessionError>;

    fn resize(&mut self, size: TerminalSize) -> Result<(), SessionError>;

    /// Forcefully terminate the process. Succeeds if it has already exited.
    fn kill(&mut self) -> Result<(), SessionError>;
}

/// Spawns shell sessions.
pub trait SessionSpawner: Send + Sync {
    fn spawn(
        &self,
        command: &ShellCommand,
        size: TerminalSize,
    ) -> Result<Box<dyn SessionHandle>, SessionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_are_tagged_with_window() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let events = SessionEvents::new(WindowId(7), tx);

        assert!(events.data(b"abc".to_vec()));
        assert!(events.exit());

        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::Data {
                window: WindowId(7),
                bytes: b"abc".to_vec(),
            }
        );
        let exit = rx.try_recv().unwrap();
        assert_eq!(exit, SessionEvent::Exit { window: WindowId(7) });
        assert_eq!(exit.window(), WindowId(7));
    }

    #[test]
    fn test_send_after_loop_gone() {
        let (tx, rx) = mpsc::unbounded_channel();
        let events = SessionEvents::new(WindowId(1), tx);
        drop(rx);
        assert!(!events.data(b"late".to_vec()));
        assert!(!events.exit());
    }
}
