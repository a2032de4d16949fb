//! Application state shared between Tauri commands, window events and the
//! session-event loop.

use std::sync::{Arc, Mutex};

use geminal_core::LifecycleController;
use tokio::sync::mpsc;

/// Global app state managed by Tauri.
pub struct AppState {
    pub controller: Arc<LifecycleController>,
    /// Signals the session-event loop to stop. Taken on first use.
    event_loop_stop: Mutex<Option<mpsc::Sender<()>>>,
}

impl AppState {
    pub fn new(controller: Arc<LifecycleController>, event_loop_stop: mpsc::Sender<()>) -> Self {
        Self {
            controller,
            event_loop_stop: Mutex::new(Some(event_loop_stop)),
        }
    }

    /// Tear down every window and stop the event loop.
    pub fn shutdown(&self) {
        self.controller.shutdown();
        let stop = self
            .event_loop_stop
            .lock()
            .ok()
            .and_then(|mut stop| stop.take());
        if let Some(tx) = stop {
            // The loop may already be gone; that's fine.
            let _ = tx.try_send(());
        }
    }
}
