use std::io::{Read, Write};
use std::path::PathBuf;

use geminal_core::{ShellCommand, TerminalSize};
use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use thiserror::Error;

/// Errors from PTY operations.
#[derive(Debug, Error)]
pub enum PtyError {
    #[error("PTY spawn failed: {0}")]
    SpawnFailed(String),
    #[error("PTY I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("PTY resize failed: {0}")]
    ResizeFailed(String),
    #[error("PTY kill failed: {0}")]
    KillFailed(String),
    #[error("PTY reader was already taken")]
    ReaderTaken,
}

/// Owns a portable-pty child process, master pair, reader, and writer.
///
/// Dropping the handle kills the child if it is still running.
pub struct PtyHandle {
    master: Box<dyn MasterPty + Send>,
    reader: Option<Box<dyn Read + Send>>,
    writer: Box<dyn Write + Send>,
    child: Box<dyn Child + Send + Sync>,
}

impl PtyHandle {
    /// Spawn `command` on a new PTY of the given size.
    ///
    /// With no program set, uses the user's default shell (`$SHELL` or
    /// `/bin/sh`); with no working directory, starts in `$HOME`.
    pub fn spawn(command: &ShellCommand, size: TerminalSize) -> Result<Self, PtyError> {
        let pty_system = native_pty_system();

        let pair = pty_system
            .openpty(pty_size(size))
            .map_err(|e| PtyError::SpawnFailed(format!("failed to open PTY: {e}")))?;

        let program = command.program.clone().unwrap_or_else(default_shell);
        let mut cmd = CommandBuilder::new(program);
        if let Some(dir) = command.working_dir.clone().or_else(home_dir) {
            cmd.cwd(dir);
        }
        if !command.term.is_empty() {
            cmd.env("TERM", &command.term);
        }

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| PtyError::SpawnFailed(format!("failed to spawn command: {e}")))?;

        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| PtyError::SpawnFailed(format!("failed to clone reader: {e}")))?;

        let writer = pair
            .master
            .take_writer()
            .map_err(|e| PtyError::SpawnFailed(format!("failed to take writer: {e}")))?;

        Ok(Self {
            master: pair.master,
            reader: Some(reader),
            writer,
            child,
        })
    }

    /// Resize the PTY to new dimensions.
    pub fn resize(&self, size: TerminalSize) -> Result<(), PtyError> {
        self.master
            .resize(pty_size(size))
            .map_err(|e| PtyError::ResizeFailed(format!("{e}")))
    }

    /// Write bytes to the PTY master (user input -> shell).
    pub fn write(&mut self, data: &[u8]) -> Result<(), PtyError> {
        self.writer.write_all(data)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Take the PTY reader for a dedicated I/O thread. Reads block, so the
    /// reader must not live behind a lock shared with writers.
    pub fn take_reader(&mut self) -> Result<Box<dyn Read + Send>, PtyError> {
        self.reader.take().ok_or(PtyError::ReaderTaken)
    }

    /// Get the child process exit status if it has exited.
    ///
    /// Returns `None` if the process is still running.
    pub fn try_wait(&mut self) -> Option<u32> {
        match self.child.try_wait() {
            Ok(Some(status)) => Some(status.exit_code()),
            _ => None,
        }
    }

    /// Terminate the child and reap it. A child that already exited is not
    /// an error.
    pub fn kill(&mut self) -> Result<(), PtyError> {
        if self.try_wait().is_some() {
            return Ok(());
        }
        self.child
            .kill()
            .map_err(|e| PtyError::KillFailed(e.to_string()))?;
        self.child.wait()?;
        Ok(())
    }
}

impl Drop for PtyHandle {
    fn drop(&mut self) {
        if let Err(e) = self.kill() {
            log::warn!("failed to kill PTY child on drop: {e}");
        }
    }
}

fn pty_size(size: TerminalSize) -> PtySize {
    PtySize {
        rows: size.rows,
        cols: size.cols,
        pixel_width: 0,
        pixel_height: 0,
    }
}

/// Returns the user's default shell, falling back to `/bin/sh`.
fn default_shell() -> String {
    std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

#[cfg(test)]
pub(crate) fn sh() -> ShellCommand {
    ShellCommand {
        program: Some("/bin/sh".to_string()),
        working_dir: None,
        term: "xterm-color".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn test_spawn_pty() {
        let handle = PtyHandle::spawn(&sh(), TerminalSize::new(80, 24));
        assert!(handle.is_ok(), "Failed to spawn PTY: {:?}", handle.err());
        let mut handle = handle.unwrap();
        assert!(handle.try_wait().is_none());
    }

    #[test]
    fn test_spawn_missing_program_fails() {
        let command = ShellCommand {
            program: Some("/definitely/not/a/shell".to_string()),
            ..sh()
        };
        assert!(PtyHandle::spawn(&command, TerminalSize::new(80, 24)).is_err());
    }

    #[test]
    fn test_write_read_echo() {
        let mut handle = PtyHandle::spawn(&sh(), TerminalSize::new(80, 24)).unwrap();
        let mut reader = handle.take_reader().unwrap();

        handle.write(b"echo GEMINAL_TEST_OK\n").unwrap();

        let mut output = Vec::new();
        let mut buf = [0u8; 4096];
        let deadline = Instant::now() + Duration::from_secs(3);
        loop {
            if Instant::now() > deadline {
                break;
            }
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    output.extend_from_slice(&buf[..n]);
                    // The echoed command line contains the marker too; wait
                    // for it to appear twice.
                    let text = String::from_utf8_lossy(&output);
                    if text.matches("GEMINAL_TEST_OK").count() >= 2 {
                        break;
                    }
                }
                Err(_) => break,
            }
        }

        let text = String::from_utf8_lossy(&output);
        assert!(
            text.contains("GEMINAL_TEST_OK"),
            "Expected output to contain GEMINAL_TEST_OK, got: {text}"
        );
    }

    #[test]
    fn test_reader_taken_once() {
        let mut handle = PtyHandle::spawn(&sh(), TerminalSize::new(80, 24)).unwrap();
        assert!(handle.take_reader().is_ok());
        assert!(matches!(handle.take_reader(), Err(PtyError::ReaderTaken)));
    }

    #[test]
    fn test_resize() {
        let handle = PtyHandle::spawn(&sh(), TerminalSize::new(80, 24)).unwrap();
        let result = handle.resize(TerminalSize::new(120, 40));
        assert!(result.is_ok(), "Resize failed: {:?}", result.err());
    }

    #[test]
    fn test_kill() {
        let mut handle = PtyHandle::spawn(&sh(), TerminalSize::new(80, 24)).unwrap();
        assert!(handle.try_wait().is_none());

        handle.kill().unwrap();
        assert!(handle.try_wait().is_some());
        // Killing again is fine.
        handle.kill().unwrap();
    }

    #[test]
    fn test_child_exit() {
        let mut handle = PtyHandle::spawn(&sh(), TerminalSize::new(80, 24)).unwrap();
        handle.write(b"exit 0\n").unwrap();

        // The PTY reader blocks, so we drain it in a background thread.
        let mut reader = handle.take_reader().unwrap();
        let drain = thread::spawn(move || {
            let mut buf = [0u8; 4096];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) | Err(_) => return,
                    Ok(_) => {}
                }
            }
        });
        let _ = drain.join();

        let deadline = Instant::now() + Duration::from_secs(3);
        while Instant::now() < deadline && handle.try_wait().is_none() {
            thread::sleep(Duration::from_millis(50));
        }

        assert_eq!(handle.try_wait(), Some(0));
    }

    #[test]
    fn test_default_shell_detection() {
        let shell = default_shell();
        assert!(!shell.is_empty(), "Default shell should not be empty");
        assert!(
            shell.starts_with('/'),
            "Default shell should be an absolute path, got: {shell}"
        );
    }
}
