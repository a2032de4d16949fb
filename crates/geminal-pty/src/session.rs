use geminal_core::{
    SessionError, SessionEvents, SessionHandle, SessionSpawner, ShellCommand, TerminalSize,
};

use crate::io_thread::start_io_thread;
use crate::pty::{PtyError, PtyHandle};

/// A PTY-backed shell session.
///
/// Output starts flowing only once [`SessionHandle::subscribe`] hands the
/// reader to its I/O thread.
pub struct PtySession {
    pty: PtyHandle,
}

impl PtySession {
    pub fn spawn(command: &ShellCommand, size: TerminalSize) -> Result<Self, PtyError> {
        Ok(Self {
            pty: PtyHandle::spawn(command, size)?,
        })
    }
}

impl SessionHandle for PtySession {
    fn subscribe(&mut self, events: SessionEvents) -> Result<(), SessionError> {
        let reader = self
            .pty
            .take_reader()
            .map_err(|_| SessionError::AlreadySubscribed)?;
        start_io_thread(events, reader)
            .map_err(|e| SessionError::Spawn(format!("failed to start I/O thread: {e}")))
    }

    fn write(&mut self, data: &[u8]) -> Result<(), SessionError> {
        self.pty
            .write(data)
            .map_err(|e| SessionError::Write(e.to_string()))
    }

    fn resize(&mut self, size: TerminalSize) -> Result<(), SessionError> {
        self.pty
            .resize(size)
            .map_err(|e| SessionError::Resize(e.to_string()))
    }

    fn kill(&mut self) -> Result<(), SessionError> {
        self.pty.kill().map_err(|e| SessionError::Kill(e.to_string()))
    }
}

/// Spawns sessions on the native PTY system.
#[derive(Debug, Default, Clone, Copy)]
pub struct PtySpawner;

impl SessionSpawner for PtySpawner {
    fn spawn(
        &self,
        command: &ShellCommand,
        size: TerminalSize,
    ) -> Result<Box<dyn SessionHandle>, SessionError> {
        let session = PtySession::spawn(command, size)
            .map_err(|e| SessionError::Spawn(e.to_string()))?;
        log::debug!("spawned shell session ({}x{})", size.cols, size.rows);
        Ok(Box::new(session))
    }
}
