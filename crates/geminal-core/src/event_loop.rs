//! The control loop that drains session events.
//!
//! Every session reports on one channel, so output from a single session is
//! handled in the order the shell produced it. Sessions are independent of
//! each other and no ordering between them is kept.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::controller::LifecycleController;
use crate::session::SessionEventReceiver;

/// Handle session events until `stop_rx` fires or every sender is gone.
///
/// Events already queued when the stop signal arrives are handled first.
pub async fn run(
    controller: Arc<LifecycleController>,
    mut events: SessionEventReceiver,
    mut stop_rx: mpsc::Receiver<()>,
) {
    loop {
        tokio::select! {
            biased;
            event = events.recv() => match event {
                Some(event) => controller.handle_session_event(event),
                None => break,
            },
            _ = stop_rx.recv() => break,
        }
    }
    log::debug!("session event loop stopped");
}
