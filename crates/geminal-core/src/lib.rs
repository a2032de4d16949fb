//! geminal-core: window and shell-session lifecycle management for geminal.
//!
//! Every terminal window is bound 1:1 to an interactive shell session. This
//! crate owns that binding and nothing else: pty allocation, terminal
//! emulation and window drawing live behind the collaborator traits.
//!
//! # Architecture
//!
//! - [`WindowRegistry`] — The table of live [`WindowRecord`]s, keyed by [`WindowId`].
//! - [`LifecycleController`] — Creates and tears down windows, runs the
//!   close-confirmation protocol, and fans commands out across windows.
//! - [`router`] — Input (window → session) and output (session → window) routing.
//! - [`event_loop`] — Drains [`SessionEvent`]s from all sessions on one task.
//! - [`SessionSpawner`], [`WindowSurfaceProvider`], [`ConfirmationDialog`] —
//!   the seams to the pty, the windowing toolkit, and the dialog UI.

pub mod color;
pub mod config;
pub mod controller;
pub mod error;
pub mod event_loop;
pub mod geometry;
pub mod registry;
pub mod router;
pub mod session;
pub mod surface;

#[cfg(test)]
mod testing;

pub use color::{ColorAssigner, ColorIdentity, PALETTE};
pub use config::ControllerConfig;
pub use controller::{
    CloseRequest, ConfirmationDialog, CreateWindow, LifecycleController, ResizeOutcome,
    WindowInfo,
};
pub use error::{CreationError, RegistryError, SessionError, SurfaceError};
pub use geometry::{clamp_bounds, Bounds, GeometryLimits, WorkArea};
pub use registry::{WindowPhase, WindowRecord, WindowRegistry};
pub use router::Delivery;
pub use session::{
    SessionEvent, SessionEventReceiver, SessionEvents, SessionHandle, SessionSpawner,
    ShellCommand, TerminalSize,
};
pub use surface::{
    DisplayEvent, StackingConfig, WindowConfig, WindowId, WindowLevel, WindowSurface,
    WindowSurfaceProvider,
};
