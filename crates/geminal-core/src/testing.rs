//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::ControllerConfig;
use crate::controller::{ConfirmationDialog, LifecycleController};
use crate::error::{SessionError, SurfaceError};
use crate::geometry::{Bounds, WorkArea};
use crate::registry::lock;
use crate::session::{
    SessionEventReceiver, SessionEvents, SessionHandle, SessionSpawner, ShellCommand,
    TerminalSize,
};
use crate::surface::{
    DisplayEvent, StackingConfig, WindowConfig, WindowId, WindowSurface, WindowSurfaceProvider,
};

#[derive(Default)]
struct ProbeState {
    written: Vec<u8>,
    sizes: Vec<TerminalSize>,
    killed: bool,
    events: Option<SessionEvents>,
    fail_writes: bool,
    fail_resizes: bool,
    fail_subscribe: bool,
}

/// Test-side view of a [`FakeSession`].
#[derive(Clone, Default)]
pub(crate) struct SessionProbe(Arc<Mutex<ProbeState>>);

impl SessionProbe {
    pub fn written(&self) -> Vec<u8> {
        lock(&self.0).written.clone()
    }

    pub fn sizes(&self) -> Vec<TerminalSize> {
        lock(&self.0).sizes.clone()
    }

    pub fn is_killed(&self) -> bool {
        lock(&self.0).killed
    }

    pub fn is_subscribed(&self) -> bool {
        lock(&self.0).events.is_some()
    }

    pub fn fail_writes(&self) {
        lock(&self.0).fail_writes = true;
    }

    pub fn fail_resizes(&self) {
        lock(&self.0).fail_resizes = true;
    }

    pub fn fail_subscribe(&self) {
        lock(&self.0).fail_subscribe = true;
    }

    /// Emit output as the shell would. Returns `false` if not subscribed.
    pub fn emit(&self, bytes: &[u8]) -> bool {
        let events = lock(&self.0).events.clone();
        events.is_some_and(|e| e.data(bytes.to_vec()))
    }

    /// Emit end-of-stream as an exiting shell would.
    pub fn exit(&self) -> bool {
        let events = lock(&self.0).events.clone();
        events.is_some_and(|e| e.exit())
    }
}

pub(crate) struct FakeSession {
    probe: SessionProbe,
}

impl FakeSession {
    pub fn new() -> (Self, SessionProbe) {
        let probe = SessionProbe::default();
        (
            Self {
                probe: probe.clone(),
            },
            probe,
        )
    }
}

impl SessionHandle for FakeSession {
    fn subscribe(&mut self, events: SessionEvents) -> Result<(), SessionError> {
        let mut state = lock(&self.probe.0);
        if state.fail_subscribe {
            return Err(SessionError::Spawn("reader thread".to_string()));
        }
        if state.events.is_some() {
            return Err(SessionError::AlreadySubscribed);
        }
        state.events = Some(events);
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), SessionError> {
        let mut state = lock(&self.probe.0);
        if state.fail_writes || state.killed {
            return Err(SessionError::Write("broken pipe".to_string()));
        }
        state.written.extend_from_slice(data);
        Ok(())
    }

    fn resize(&mut self, size: TerminalSize) -> Result<(), SessionError> {
        let mut state = lock(&self.probe.0);
        if state.fail_resizes {
            return Err(SessionError::Resize("ioctl failed".to_string()));
        }
        state.sizes.push(size);
        Ok(())
    }

    fn kill(&mut self) -> Result<(), SessionError> {
        lock(&self.probe.0).killed = true;
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeSpawner {
    probes: Mutex<Vec<SessionProbe>>,
    commands: Mutex<Vec<(ShellCommand, TerminalSize)>>,
    fail_next: AtomicBool,
    fail_subscribe_next: AtomicBool,
}

impl FakeSpawner {
    pub fn probe(&self, index: usize) -> SessionProbe {
        lock(&self.probes)[index].clone()
    }

    pub fn spawned(&self) -> usize {
        lock(&self.probes).len()
    }

    pub fn live_sessions(&self) -> usize {
        lock(&self.probes).iter().filter(|p| !p.is_killed()).count()
    }

    pub fn commands(&self) -> Vec<(ShellCommand, TerminalSize)> {
        lock(&self.commands).clone()
    }

    pub fn fail_next_spawn(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_subscribe(&self) {
        self.fail_subscribe_next.store(true, Ordering::SeqCst);
    }
}

impl SessionSpawner for FakeSpawner {
    fn spawn(
        &self,
        command: &ShellCommand,
        size: TerminalSize,
    ) -> Result<Box<dyn SessionHandle>, SessionError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(SessionError::Spawn("no such shell".to_string()));
        }
        let (session, probe) = FakeSession::new();
        if self.fail_subscribe_next.swap(false, Ordering::SeqCst) {
            probe.fail_subscribe();
        }
        lock(&self.probes).push(probe);
        lock(&self.commands).push((command.clone(), size));
        Ok(Box::new(session))
    }
}

struct SurfaceState {
    bounds: Bounds,
    work_area: Option<WorkArea>,
    stacking: Option<StackingConfig>,
    visible: bool,
    focused: usize,
    destroyed: bool,
    sent: Vec<DisplayEvent>,
    fail_bounds: bool,
    fail_stacking: bool,
}

pub(crate) struct FakeSurface {
    state: Mutex<SurfaceState>,
}

impl FakeSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SurfaceState {
                bounds: Bounds::new(0, 0, 800, 600),
                work_area: None,
                stacking: None,
                visible: true,
                focused: 0,
                destroyed: false,
                sent: Vec::new(),
                fail_bounds: false,
                fail_stacking: false,
            }),
        })
    }

    pub fn sent(&self) -> Vec<DisplayEvent> {
        lock(&self.state).sent.clone()
    }

    pub fn outputs(&self) -> Vec<Vec<u8>> {
        self.sent()
            .into_iter()
            .filter_map(|e| match e {
                DisplayEvent::Output { data } => Some(data),
                _ => None,
            })
            .collect()
    }

    pub fn current_bounds(&self) -> Bounds {
        lock(&self.state).bounds
    }

    pub fn stacking(&self) -> Option<StackingConfig> {
        lock(&self.state).stacking
    }

    pub fn is_visible(&self) -> bool {
        lock(&self.state).visible
    }

    pub fn focus_count(&self) -> usize {
        lock(&self.state).focused
    }

    pub fn is_destroyed(&self) -> bool {
        lock(&self.state).destroyed
    }

    pub fn set_work_area(&self, work_area: WorkArea) {
        lock(&self.state).work_area = Some(work_area);
    }

    pub fn fail_set_bounds(&self) {
        lock(&self.state).fail_bounds = true;
    }

    pub fn fail_stacking(&self) {
        lock(&self.state).fail_stacking = true;
    }

    fn alive(&self) -> Result<std::sync::MutexGuard<'_, SurfaceState>, SurfaceError> {
        let state = lock(&self.state);
        if state.destroyed {
            return Err(SurfaceError::Operation("window destroyed".to_string()));
        }
        Ok(state)
    }
}

impl WindowSurface for FakeSurface {
    fn set_bounds(&self, bounds: Bounds) -> Result<(), SurfaceError> {
        let mut state = self.alive()?;
        if state.fail_bounds {
            return Err(SurfaceError::Operation("set_bounds rejected".to_string()));
        }
        state.bounds = bounds;
        Ok(())
    }

    fn work_area(&self) -> Option<WorkArea> {
        lock(&self.state).work_area
    }

    fn set_stacking(&self, config: StackingConfig) -> Result<(), SurfaceError> {
        let mut state = self.alive()?;
        if state.fail_stacking {
            return Err(SurfaceError::Operation("stacking rejected".to_string()));
        }
        state.stacking = Some(config);
        Ok(())
    }

    fn show(&self) -> Result<(), SurfaceError> {
        self.alive()?.visible = true;
        Ok(())
    }

    fn hide(&self) -> Result<(), SurfaceError> {
        self.alive()?.visible = false;
        Ok(())
    }

    fn focus(&self) -> Result<(), SurfaceError> {
        self.alive()?.focused += 1;
        Ok(())
    }

    fn destroy(&self) -> Result<(), SurfaceError> {
        lock(&self.state).destroyed = true;
        Ok(())
    }

    fn send(&self, event: &DisplayEvent) -> Result<(), SurfaceError> {
        self.alive()?.sent.push(event.clone());
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeSurfaceProvider {
    surfaces: Mutex<HashMap<WindowId, Arc<FakeSurface>>>,
    configs: Mutex<HashMap<WindowId, WindowConfig>>,
    fail_next: AtomicBool,
}

impl FakeSurfaceProvider {
    pub fn surface(&self, id: WindowId) -> Arc<FakeSurface> {
        lock(&self.surfaces)[&id].clone()
    }

    pub fn config(&self, id: WindowId) -> WindowConfig {
        lock(&self.configs)[&id].clone()
    }

    pub fn created(&self) -> usize {
        lock(&self.surfaces).len()
    }

    pub fn fail_next_create(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl WindowSurfaceProvider for FakeSurfaceProvider {
    fn create(
        &self,
        id: WindowId,
        config: &WindowConfig,
    ) -> Result<Arc<dyn WindowSurface>, SurfaceError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(SurfaceError::Create("no display".to_string()));
        }
        let surface = FakeSurface::new();
        lock(&self.surfaces).insert(id, surface.clone());
        lock(&self.configs).insert(id, config.clone());
        Ok(surface)
    }
}

#[derive(Default)]
pub(crate) struct FakeDialog {
    shown: Mutex<Vec<WindowId>>,
    dismissed: Mutex<Vec<WindowId>>,
}

impl FakeDialog {
    pub fn shown(&self) -> Vec<WindowId> {
        lock(&self.shown).clone()
    }

    pub fn dismissed(&self) -> Vec<WindowId> {
        lock(&self.dismissed).clone()
    }
}

impl ConfirmationDialog for FakeDialog {
    fn show_confirmation(&self, anchor: WindowId, _surface: &dyn WindowSurface) {
        lock(&self.shown).push(anchor);
    }

    fn dismiss(&self, anchor: WindowId, _surface: &dyn WindowSurface) {
        lock(&self.dismissed).push(anchor);
    }
}

/// A controller wired to fakes, plus the session event receiver.
pub(crate) struct Harness {
    pub controller: LifecycleController,
    pub events: SessionEventReceiver,
    pub spawner: Arc<FakeSpawner>,
    pub surfaces: Arc<FakeSurfaceProvider>,
    pub dialog: Arc<FakeDialog>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(ControllerConfig::default())
    }

    pub fn with_config(config: ControllerConfig) -> Self {
        let spawner = Arc::new(FakeSpawner::default());
        let surfaces = Arc::new(FakeSurfaceProvider::default());
        let dialog = Arc::new(FakeDialog::default());
        let (controller, events) = LifecycleController::new(
            config,
            spawner.clone(),
            surfaces.clone(),
            dialog.clone(),
        );
        Self {
            controller: controller.with_color_seed(0x5eed),
            events,
            spawner,
            surfaces,
            dialog,
        }
    }

    /// Deliver every queued session event, as the event loop would.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            self.controller.handle_session_event(event);
            handled += 1;
        }
        handled
    }
}
