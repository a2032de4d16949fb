//! geminal-pty: the shell-session provider for geminal.
//!
//! Spawns interactive shells on pseudo-terminals and plugs them into
//! `geminal-core` through its session traits.
//!
//! # Architecture
//!
//! - [`PtyHandle`] — Low-level PTY process management (spawn, read, write, resize, kill).
//! - [`PtySession`] — A `PtyHandle` as a core `SessionHandle`; its output is
//!   pumped by a dedicated I/O thread once subscribed.
//! - [`PtySpawner`] — The core `SessionSpawner` backed by the native PTY system.

mod io_thread;
pub mod pty;
pub mod session;

pub use pty::{PtyError, PtyHandle};
pub use session::{PtySession, PtySpawner};
