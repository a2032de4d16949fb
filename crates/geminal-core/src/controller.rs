//! Window lifecycle: creation, the close-confirmation protocol, teardown,
//! and commands that fan out across every window.
//!
//! A window moves through `Creating → Active → ClosePending → Destroyed`.
//! Creation is all-or-nothing: the record is registered only once both the
//! session and the surface exist, and its output is subscribed only after
//! registration so no chunk can arrive for an unknown window.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, info, warn};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::color::{ColorAssigner, ColorIdentity};
use crate::config::ControllerConfig;
use crate::error::{CreationError, SurfaceError};
use crate::geometry::{clamp_bounds, Bounds};
use crate::registry::{lock, WindowPhase, WindowRecord, WindowRegistry};
use crate::router::{self, Delivery};
use crate::session::{
    SessionEvent, SessionEventReceiver, SessionEvents, SessionSpawner, TerminalSize,
};
use crate::surface::{
    DisplayEvent, WindowConfig, WindowId, WindowLevel, WindowSurface, WindowSurfaceProvider,
};

/// The confirmation-dialog collaborator.
///
/// The user's answer comes back through
/// [`LifecycleController::confirmation_resolved`].
pub trait ConfirmationDialog: Send + Sync {
    fn show_confirmation(&self, anchor: WindowId, surface: &dyn WindowSurface);

    /// Withdraw a dialog whose window is being torn down.
    fn dismiss(&self, anchor: WindowId, surface: &dyn WindowSurface);
}

/// A dialog drawn by the window's own UI, driven by display events.
pub struct InWindowConfirmation;

impl ConfirmationDialog for InWindowConfirmation {
    fn show_confirmation(&self, anchor: WindowId, surface: &dyn WindowSurface) {
        if let Err(e) = surface.focus() {
            debug!("window {anchor}: focus before confirmation failed: {e}");
        }
        if let Err(e) = surface.send(&DisplayEvent::ConfirmClose) {
            warn!("window {anchor}: could not show close confirmation: {e}");
        }
    }

    fn dismiss(&self, anchor: WindowId, surface: &dyn WindowSurface) {
        if let Err(e) = surface.send(&DisplayEvent::CloseDismissed) {
            debug!("window {anchor}: could not dismiss confirmation: {e}");
        }
    }
}

/// A request to open a new terminal window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateWindow {
    /// The primary window carries no color identity.
    pub primary: bool,
    pub position: Option<(i32, i32)>,
}

impl CreateWindow {
    pub fn primary() -> Self {
        Self {
            primary: true,
            position: None,
        }
    }

    pub fn secondary() -> Self {
        Self::default()
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.position = Some((x, y));
        self
    }
}

/// Result of a close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseRequest {
    /// A confirmation dialog is now showing for this window.
    DialogShown,
    /// This window's dialog is already showing; it was focused instead.
    AlreadyPending,
    /// Another window's dialog is showing; this one is next in line.
    Queued,
    NotFound,
}

/// Result of a window resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeOutcome {
    /// The clamped bounds that were requested of the surface.
    pub bounds: Bounds,
    pub geometry_applied: bool,
    /// Outcome of the terminal resize, if one was requested.
    pub terminal: Option<Delivery>,
}

/// Per-window details a freshly loaded UI asks for.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WindowInfo {
    pub id: WindowId,
    pub primary: bool,
    pub color: Option<ColorIdentity>,
    pub level: WindowLevel,
    pub phase: WindowPhase,
}

#[derive(Debug, Default)]
struct CloseQueue {
    /// Window whose dialog is currently showing.
    pending: Option<WindowId>,
    /// Windows waiting for their turn, oldest first.
    queued: VecDeque<WindowId>,
}

/// Owns every window/session pair and is the only thing that mutates them.
pub struct LifecycleController {
    config: ControllerConfig,
    registry: WindowRegistry,
    spawner: Arc<dyn SessionSpawner>,
    surfaces: Arc<dyn WindowSurfaceProvider>,
    dialog: Arc<dyn ConfirmationDialog>,
    colors: Mutex<ColorAssigner>,
    close: Mutex<CloseQueue>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    next_id: AtomicU64,
}

impl LifecycleController {
    /// Create a controller and the receiver its sessions report on. Feed the
    /// receiver to [`crate::event_loop::run`].
    pub fn new(
        config: ControllerConfig,
        spawner: Arc<dyn SessionSpawner>,
        surfaces: Arc<dyn WindowSurfaceProvider>,
        dialog: Arc<dyn ConfirmationDialog>,
    ) -> (Self, SessionEventReceiver) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let colors = ColorAssigner::new(config.color_history);
        let controller = Self {
            config,
            registry: WindowRegistry::new(),
            spawner,
            surfaces,
            dialog,
            colors: Mutex::new(colors),
            close: Mutex::new(CloseQueue::default()),
            events_tx,
            next_id: AtomicU64::new(1),
        };
        (controller, events_rx)
    }

    /// Replace the color assigner with a deterministically seeded one.
    pub fn with_color_seed(self, seed: u64) -> Self {
        *lock(&self.colors) = ColorAssigner::with_seed(self.config.color_history, seed);
        self
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    pub fn is_registered(&self, id: WindowId) -> bool {
        self.registry.contains(id)
    }

    pub fn window_count(&self) -> usize {
        self.registry.len()
    }

    /// Window whose close confirmation is currently showing.
    pub fn pending_close(&self) -> Option<WindowId> {
        lock(&self.close).pending
    }

    /// Windows waiting for a confirmation dialog, oldest first.
    pub fn queued_closes(&self) -> Vec<WindowId> {
        lock(&self.close).queued.iter().copied().collect()
    }

    /// Spawn a session and a window for it, and register the pair.
    pub fn create_window(&self, request: CreateWindow) -> Result<WindowId, CreationError> {
        let id = WindowId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut session = self
            .spawner
            .spawn(&self.config.shell_command(), self.config.initial_size)
            .map_err(CreationError::Session)?;

        let color = if request.primary {
            None
        } else {
            lock(&self.colors).assign()
        };

        let window_config = WindowConfig {
            width: self.config.window_width,
            height: self.config.window_height,
            position: request.position,
            color,
            primary: request.primary,
        };
        let surface = match self.surfaces.create(id, &window_config) {
            Ok(surface) => surface,
            Err(e) => {
                if let Err(kill_err) = session.kill() {
                    warn!("window {id}: killing orphaned session failed: {kill_err}");
                }
                self.forget_color(color);
                return Err(CreationError::Surface(e));
            }
        };

        let level = self.config.initial_level;
        if let Err(e) = surface.set_stacking(level.stacking()) {
            warn!("window {id}: initial level {} not applied: {e}", level.as_str());
        }

        let record = Arc::new(WindowRecord::new(
            id,
            surface,
            session,
            color,
            request.primary,
            level,
        ));
        if let Err(e) = self.registry.register(Arc::clone(&record)) {
            release(&record);
            self.forget_color(color);
            return Err(e.into());
        }

        let events = SessionEvents::new(id, self.events_tx.clone());
        if let Err(e) = record.with_session(|session| session.subscribe(events)) {
            self.registry.unregister(id);
            release(&record);
            self.forget_color(color);
            return Err(CreationError::Subscribe(e));
        }

        info!(
            "window {id} created ({})",
            if request.primary { "primary" } else { "secondary" }
        );
        Ok(id)
    }

    /// Ask to close a window. Nothing is torn down until the user confirms.
    pub fn request_close(&self, id: WindowId) -> CloseRequest {
        // Look the window up under the close lock: teardown unregisters under
        // the same lock, so a window is never made pending after it is gone.
        let (record, outcome) = {
            let mut close = lock(&self.close);
            let Some(record) = self.registry.lookup(id) else {
                return CloseRequest::NotFound;
            };
            let outcome = match close.pending {
                Some(pending) if pending == id => CloseRequest::AlreadyPending,
                Some(_) => {
                    if !close.queued.contains(&id) {
                        close.queued.push_back(id);
                    }
                    record.set_phase(WindowPhase::ClosePending);
                    CloseRequest::Queued
                }
                None => {
                    close.pending = Some(id);
                    record.set_phase(WindowPhase::ClosePending);
                    CloseRequest::DialogShown
                }
            };
            (record, outcome)
        };

        match outcome {
            CloseRequest::AlreadyPending => {
                if let Err(e) = record.surface().focus() {
                    debug!("window {id}: focus failed: {e}");
                }
            }
            CloseRequest::Queued => {
                debug!("window {id}: close queued behind another confirmation");
            }
            CloseRequest::DialogShown => {
                self.dialog.show_confirmation(id, record.surface().as_ref());
            }
            CloseRequest::NotFound => {}
        }
        outcome
    }

    /// The user answered the outstanding confirmation. Returns the window it
    /// was for, or `None` if no dialog was outstanding.
    pub fn confirmation_resolved(&self, accepted: bool) -> Option<WindowId> {
        self.resolve(None, accepted)
    }

    /// Like [`Self::confirmation_resolved`], but only answers the dialog if
    /// it belongs to `anchor`.
    pub fn confirmation_resolved_by(&self, anchor: WindowId, accepted: bool) -> Option<WindowId> {
        self.resolve(Some(anchor), accepted)
    }

    fn resolve(&self, anchor: Option<WindowId>, accepted: bool) -> Option<WindowId> {
        let id = {
            let mut close = lock(&self.close);
            match (close.pending, anchor) {
                (None, _) => {
                    debug!("confirmation resolved with no dialog outstanding");
                    return None;
                }
                (Some(pending), Some(anchor)) if pending != anchor => {
                    debug!("window {anchor} cannot answer window {pending}'s confirmation");
                    return None;
                }
                (Some(pending), _) => {
                    close.pending = None;
                    pending
                }
            }
        };

        if accepted {
            self.teardown(id);
        } else if let Some(record) = self.registry.lookup(id) {
            record.set_phase(WindowPhase::Active);
            debug!("window {id}: close cancelled");
        }

        self.advance_close_queue();
        Some(id)
    }

    /// The windowing toolkit reports a window as gone. Idempotent.
    pub fn window_closed(&self, id: WindowId) -> bool {
        self.teardown(id)
    }

    pub fn handle_session_event(&self, event: SessionEvent) {
        match event {
            SessionEvent::Data { window, bytes } => {
                router::route_output(&self.registry, window, bytes);
            }
            SessionEvent::Exit { window } => {
                // The user ended the shell; no confirmation needed.
                if self.teardown(window) {
                    info!("window {window}: shell exited");
                }
            }
        }
    }

    pub fn route_input(&self, source: WindowId, data: &[u8]) -> Delivery {
        router::route_input(&self.registry, source, data)
    }

    /// Move or resize a window, then optionally resize its terminal.
    ///
    /// The geometry update never depends on the terminal resize; a failed
    /// terminal resize is logged and reported, not rolled back.
    pub fn resize_window(
        &self,
        id: WindowId,
        requested: Bounds,
        grid: Option<TerminalSize>,
    ) -> Option<ResizeOutcome> {
        let record = self.registry.lookup(id)?;
        let surface = record.surface();
        let limits = &self.config.limits;

        let bounds = match surface.work_area() {
            Some(work_area) => clamp_bounds(requested, work_area, limits),
            None => Bounds {
                width: requested.width.max(limits.min_width),
                height: requested.height.max(limits.min_height),
                ..requested
            },
        };

        let geometry_applied = match surface.set_bounds(bounds) {
            Ok(()) => true,
            Err(e) => {
                warn!("window {id}: {e}");
                false
            }
        };

        let terminal = grid.map(|size| resize_session(&record, size));
        Some(ResizeOutcome {
            bounds,
            geometry_applied,
            terminal,
        })
    }

    /// Resize only the terminal grid of a window's session.
    pub fn resize_terminal(&self, id: WindowId, size: TerminalSize) -> Delivery {
        match self.registry.lookup(id) {
            Some(record) => resize_session(&record, size),
            None => Delivery::NoWindow,
        }
    }

    /// Switch a window's stacking level. Returns `Ok(false)` if the window
    /// does not exist; on error the previous level remains recorded.
    pub fn set_window_level(&self, id: WindowId, level: WindowLevel) -> Result<bool, SurfaceError> {
        let Some(record) = self.registry.lookup(id) else {
            return Ok(false);
        };
        record.surface().set_stacking(level.stacking())?;
        record.set_level(level);
        if let Err(e) = record.surface().send(&DisplayEvent::LevelChanged { level }) {
            debug!("window {id}: level change not announced: {e}");
        }
        Ok(true)
    }

    pub fn window_info(&self, id: WindowId) -> Option<WindowInfo> {
        self.registry.lookup(id).map(|record| WindowInfo {
            id,
            primary: record.is_primary(),
            color: record.color(),
            level: record.level(),
            phase: record.phase(),
        })
    }

    /// Show every window. Returns how many accepted the command.
    pub fn show_all(&self) -> usize {
        self.for_each_surface("show", |s| s.show())
    }

    /// Hide every window. Returns how many accepted the command.
    pub fn hide_all(&self) -> usize {
        self.for_each_surface("hide", |s| s.hide())
    }

    /// Send an application event to every window.
    pub fn broadcast(&self, channel: &str, payload: serde_json::Value) -> usize {
        let event = DisplayEvent::Broadcast {
            channel: channel.to_string(),
            payload,
        };
        self.for_each_surface("broadcast", |s| s.send(&event))
    }

    /// Tear down every window without confirmation. Returns how many were
    /// torn down.
    pub fn shutdown(&self) -> usize {
        {
            let mut close = lock(&self.close);
            close.pending = None;
            close.queued.clear();
        }
        let torn_down = self
            .registry
            .ids()
            .into_iter()
            .filter(|id| self.teardown(*id))
            .count();
        info!("shut down {torn_down} windows");
        torn_down
    }

    fn forget_color(&self, color: Option<ColorIdentity>) {
        if let Some(color) = color {
            lock(&self.colors).forget(color);
        }
    }

    fn for_each_surface(
        &self,
        what: &str,
        f: impl Fn(&dyn WindowSurface) -> Result<(), SurfaceError>,
    ) -> usize {
        let mut ok = 0;
        for record in self.registry.all() {
            match f(record.surface().as_ref()) {
                Ok(()) => ok += 1,
                Err(e) => warn!("window {}: {what} failed: {e}", record.id()),
            }
        }
        ok
    }

    /// Unregister a window and release its session and surface. Returns
    /// `false` if it was already gone.
    fn teardown(&self, id: WindowId) -> bool {
        let (record, was_pending) = {
            let mut close = lock(&self.close);
            let Some(record) = self.registry.unregister(id) else {
                return false;
            };
            close.queued.retain(|queued| *queued != id);
            let was_pending = close.pending == Some(id);
            if was_pending {
                close.pending = None;
            }
            (record, was_pending)
        };
        if was_pending {
            self.dialog.dismiss(id, record.surface().as_ref());
        }

        release(&record);
        info!("window {id} destroyed");

        if was_pending {
            self.advance_close_queue();
        }
        true
    }

    /// Show the next queued confirmation if none is outstanding.
    fn advance_close_queue(&self) {
        loop {
            let next = {
                let mut close = lock(&self.close);
                if close.pending.is_some() {
                    return;
                }
                match close.queued.pop_front() {
                    Some(next) => next,
                    None => return,
                }
            };

            // Skip windows that went away while waiting.
            let Some(record) = self.registry.lookup(next) else {
                continue;
            };

            {
                let mut close = lock(&self.close);
                if close.pending.is_some() {
                    close.queued.push_front(next);
                    return;
                }
                close.pending = Some(next);
            }
            self.dialog.show_confirmation(next, record.surface().as_ref());
            return;
        }
    }
}

/// Kill a record's session and destroy its surface. Both are unconditional.
fn release(record: &WindowRecord) {
    let id = record.id();
    record.set_phase(WindowPhase::Destroyed);
    if let Err(e) = record.with_session(|session| session.kill()) {
        warn!("window {id}: {e}");
    }
    if let Err(e) = record.surface().destroy() {
        warn!("window {id}: destroying surface failed: {e}");
    }
}

fn resize_session(record: &WindowRecord, size: TerminalSize) -> Delivery {
    match record.with_session(|session| session.resize(size)) {
        Ok(()) => Delivery::Delivered,
        Err(e) => {
            warn!("window {}: {e}", record.id());
            Delivery::Failed
        }
    }
}
