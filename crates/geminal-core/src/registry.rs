//! The table of live windows and the session each one owns.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::color::ColorIdentity;
use crate::error::RegistryError;
use crate::session::SessionHandle;
use crate::surface::{WindowId, WindowLevel, WindowSurface};

/// Lifecycle phase of a registered window.
///
/// Windows are only registered once creation has fully succeeded, so there is
/// no registered "creating" phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowPhase {
    Active,
    /// A close was requested and awaits the user's confirmation.
    ClosePending,
    /// Torn down; only observable through a stale `Arc`.
    Destroyed,
}

/// One window surface bound to exactly one shell session.
pub struct WindowRecord {
    id: WindowId,
    surface: Arc<dyn WindowSurface>,
    session: Mutex<Box<dyn SessionHandle>>,
    color: Option<ColorIdentity>,
    primary: bool,
    level: Mutex<WindowLevel>,
    phase: Mutex<WindowPhase>,
}

impl WindowRecord {
    pub fn new(
        id: WindowId,
        surface: Arc<dyn WindowSurface>,
        session: Box<dyn SessionHandle>,
        color: Option<ColorIdentity>,
        primary: bool,
        level: WindowLevel,
    ) -> Self {
        Self {
            id,
            surface,
            session: Mutex::new(session),
            color,
            primary,
            level: Mutex::new(level),
            phase: Mutex::new(WindowPhase::Active),
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn surface(&self) -> &Arc<dyn WindowSurface> {
        &self.surface
    }

    pub fn color(&self) -> Option<ColorIdentity> {
        self.color
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    pub fn level(&self) -> WindowLevel {
        *lock(&self.level)
    }

    pub fn set_level(&self, level: WindowLevel) {
        *lock(&self.level) = level;
    }

    pub fn phase(&self) -> WindowPhase {
        *lock(&self.phase)
    }

    pub fn set_phase(&self, phase: WindowPhase) {
        *lock(&self.phase) = phase;
    }

    /// Run `f` with exclusive access to the window's session.
    ///
    /// Calls from one thread are serialized, which keeps per-window input in
    /// arrival order.
    pub fn with_session<R>(&self, f: impl FnOnce(&mut dyn SessionHandle) -> R) -> R {
        let mut session = lock(&self.session);
        f(session.as_mut())
    }
}

impl std::fmt::Debug for WindowRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowRecord")
            .field("id", &self.id)
            .field("color", &self.color)
            .field("primary", &self.primary)
            .field("level", &self.level())
            .field("phase", &self.phase())
            .finish()
    }
}

/// All live windows, keyed by window id.
///
/// The lock is held only for the structural operation itself and never
/// while calling into a session or surface.
#[derive(Default)]
pub struct WindowRegistry {
    records: Mutex<HashMap<WindowId, Arc<WindowRecord>>>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record. Fails if its window id is already present.
    pub fn register(&self, record: Arc<WindowRecord>) -> Result<(), RegistryError> {
        let mut records = lock(&self.records);
        let id = record.id();
        if records.contains_key(&id) {
            return Err(RegistryError::DuplicateWindow(id));
        }
        records.insert(id, record);
        Ok(())
    }

    pub fn lookup(&self, id: WindowId) -> Option<Arc<WindowRecord>> {
        lock(&self.records).get(&id).cloned()
    }

    /// Remove a record, returning it if it was present. Removing an absent
    /// id is a no-op.
    pub fn unregister(&self, id: WindowId) -> Option<Arc<WindowRecord>> {
        lock(&self.records).remove(&id)
    }

    pub fn contains(&self, id: WindowId) -> bool {
        lock(&self.records).contains_key(&id)
    }

    /// Snapshot of every record, oldest window first. Safe to iterate while
    /// the registry is being mutated.
    pub fn all(&self) -> Vec<Arc<WindowRecord>> {
        let mut all: Vec<Arc<WindowRecord>> = lock(&self.records).values().cloned().collect();
        all.sort_by_key(|r| r.id());
        all
    }

    pub fn ids(&self) -> Vec<WindowId> {
        let mut ids: Vec<WindowId> = lock(&self.records).keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.records).is_empty()
    }
}

/// Lock a mutex, recovering the data if a panicking holder poisoned it.
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
