use std::path::PathBuf;

use crate::color::DEFAULT_HISTORY;
use crate::geometry::GeometryLimits;
use crate::session::{ShellCommand, TerminalSize};
use crate::surface::WindowLevel;

/// Default `TERM` for new sessions.
pub const DEFAULT_TERM: &str = "xterm-color";

/// Tunables for the lifecycle controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Shell to launch; `None` uses `$SHELL`.
    pub shell: Option<String>,
    pub working_dir: Option<PathBuf>,
    pub term: String,
    /// Grid size a session starts with, before the UI has measured itself.
    pub initial_size: TerminalSize,
    pub window_width: u32,
    pub window_height: u32,
    pub initial_level: WindowLevel,
    pub limits: GeometryLimits,
    /// How many recent color identities a new window avoids.
    pub color_history: usize,
}

impl ControllerConfig {
    pub fn shell_command(&self) -> ShellCommand {
        ShellCommand {
            program: self.shell.clone(),
            working_dir: self.working_dir.clone(),
            term: self.term.clone(),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            shell: None,
            working_dir: None,
            term: DEFAULT_TERM.to_string(),
            initial_size: TerminalSize::new(80, 30),
            window_width: 800,
            window_height: 600,
            initial_level: WindowLevel::Desktop,
            limits: GeometryLimits::default(),
            color_history: DEFAULT_HISTORY,
        }
    }
}
