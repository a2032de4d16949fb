//! Window surface collaborator: the windowing toolkit as seen by the core.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::color::ColorIdentity;
use crate::error::SurfaceError;
use crate::geometry::{Bounds, WorkArea};

/// Identity of a window surface. Allocated by the controller, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stacking policy of a window relative to other applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowLevel {
    /// Behind every other window, on all workspaces.
    #[default]
    Desktop,
    Normal,
    /// Always on top.
    Top,
}

/// The full always-on-top configuration for one [`WindowLevel`].
///
/// Every field is applied on every level change, so no level leaves residue
/// from the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackingConfig {
    pub always_on_top: bool,
    pub always_on_bottom: bool,
    pub all_workspaces: bool,
}

impl WindowLevel {
    pub fn stacking(self) -> StackingConfig {
        match self {
            WindowLevel::Desktop => StackingConfig {
                always_on_top: false,
                always_on_bottom: true,
                all_workspaces: true,
            },
            WindowLevel::Normal => StackingConfig {
                always_on_top: false,
                always_on_bottom: false,
                all_workspaces: false,
            },
            WindowLevel::Top => StackingConfig {
                always_on_top: true,
                always_on_bottom: false,
                all_workspaces: false,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WindowLevel::Desktop => "desktop",
            WindowLevel::Normal => "normal",
            WindowLevel::Top => "top",
        }
    }
}

impl FromStr for WindowLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "desktop" => Ok(WindowLevel::Desktop),
            "normal" => Ok(WindowLevel::Normal),
            "top" => Ok(WindowLevel::Top),
            other => Err(format!("unknown window level: {other}")),
        }
    }
}

/// Events delivered one-way from the core to a window's UI.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum DisplayEvent {
    /// A chunk of shell output, forwarded verbatim.
    Output { data: Vec<u8> },
    /// Ask the user to confirm closing this window.
    ConfirmClose,
    /// A pending confirmation was withdrawn (its window is going away).
    CloseDismissed,
    LevelChanged { level: WindowLevel },
    /// Application-defined event fanned out to every window.
    Broadcast {
        channel: String,
        payload: serde_json::Value,
    },
}

impl DisplayEvent {
    /// The UI event name this event is delivered on.
    pub fn channel(&self) -> &str {
        match self {
            DisplayEvent::Output { .. } => "terminal-output",
            DisplayEvent::ConfirmClose => "confirm-close",
            DisplayEvent::CloseDismissed => "close-dismissed",
            DisplayEvent::LevelChanged { .. } => "level-changed",
            DisplayEvent::Broadcast { channel, .. } => channel,
        }
    }
}

/// Parameters for creating a window surface.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    /// Top-left corner; `None` lets the toolkit place (usually center) it.
    pub position: Option<(i32, i32)>,
    pub color: Option<ColorIdentity>,
    pub primary: bool,
}

/// A live OS-level window.
///
/// Implementations must be cheap to call from any thread and must not call
/// back into the controller synchronously.
pub trait WindowSurface: Send + Sync {
    fn set_bounds(&self, bounds: Bounds) -> Result<(), SurfaceError>;

    /// Work area of the display containing the window, if known.
    fn work_area(&self) -> Option<WorkArea>;

    fn set_stacking(&self, config: StackingConfig) -> Result<(), SurfaceError>;

    fn show(&self) -> Result<(), SurfaceError>;

    fn hide(&self) -> Result<(), SurfaceError>;

    fn focus(&self) -> Result<(), SurfaceError>;

    /// Destroy the window without asking for confirmation.
    fn destroy(&self) -> Result<(), SurfaceError>;

    fn send(&self, event: &DisplayEvent) -> Result<(), SurfaceError>;
}

/// Creates window surfaces.
pub trait WindowSurfaceProvider: Send + Sync {
    fn create(
        &self,
        id: WindowId,
        config: &WindowConfig,
    ) -> Result<Arc<dyn WindowSurface>, SurfaceError>;
}
