//! Tauri commands invoked by a terminal window's UI.
//!
//! The calling window identifies itself through its label, so none of these
//! take a window id argument.

use geminal_core::{
    Bounds, CloseRequest, CreateWindow, Delivery, TerminalSize, WindowId, WindowInfo, WindowLevel,
};
use tauri::WebviewWindow;

use crate::state::AppState;
use crate::surface;

fn caller(window: &WebviewWindow) -> Result<WindowId, String> {
    surface::window_id(window.label())
        .ok_or_else(|| format!("{} is not a terminal window", window.label()))
}

fn delivered(id: WindowId, delivery: Delivery) -> Result<(), String> {
    match delivery {
        Delivery::Delivered => Ok(()),
        Delivery::NoWindow => Err(format!("Window {id} not found")),
        Delivery::Failed => Err(format!("Session for window {id} did not accept the request")),
    }
}

/// Open a new terminal window with its own shell.
#[tauri::command]
pub async fn new_window(
    state: tauri::State<'_, AppState>,
    x: Option<i32>,
    y: Option<i32>,
) -> Result<WindowId, String> {
    let mut request = CreateWindow::secondary();
    if let (Some(x), Some(y)) = (x, y) {
        request = request.at(x, y);
    }
    state
        .controller
        .create_window(request)
        .map_err(|e| format!("Failed to create window: {e}"))
}

/// Keystrokes from the window, forwarded to its shell.
///
/// Synchronous commands run one at a time on the main thread, in the order
/// the UI sent them, so input bytes reach the shell in order.
#[tauri::command]
pub fn terminal_input(
    window: WebviewWindow,
    state: tauri::State<'_, AppState>,
    data: String,
) -> Result<(), String> {
    let id = caller(&window)?;
    delivered(id, state.controller.route_input(id, data.as_bytes()))
}

/// Move/resize the window (clamped to the work area), optionally resizing
/// the terminal grid too. Returns the bounds actually requested.
#[tauri::command]
#[allow(clippy::too_many_arguments)]
pub async fn resize_window(
    window: WebviewWindow,
    state: tauri::State<'_, AppState>,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    cols: Option<u16>,
    rows: Option<u16>,
) -> Result<Bounds, String> {
    let id = caller(&window)?;
    let grid = match (cols, rows) {
        (Some(cols), Some(rows)) => Some(TerminalSize::new(cols, rows)),
        _ => None,
    };
    let outcome = state
        .controller
        .resize_window(id, Bounds::new(x, y, width, height), grid)
        .ok_or_else(|| format!("Window {id} not found"))?;
    Ok(outcome.bounds)
}

/// Resize only the terminal grid, after the UI refits itself.
#[tauri::command]
pub async fn terminal_resize(
    window: WebviewWindow,
    state: tauri::State<'_, AppState>,
    cols: u16,
    rows: u16,
) -> Result<(), String> {
    let id = caller(&window)?;
    delivered(
        id,
        state
            .controller
            .resize_terminal(id, TerminalSize::new(cols, rows)),
    )
}

#[tauri::command]
pub async fn set_window_level(
    window: WebviewWindow,
    state: tauri::State<'_, AppState>,
    level: WindowLevel,
) -> Result<(), String> {
    let id = caller(&window)?;
    match state.controller.set_window_level(id, level) {
        Ok(true) => Ok(()),
        Ok(false) => Err(format!("Window {id} not found")),
        Err(e) => Err(format!("Failed to set level {}: {e}", level.as_str())),
    }
}

/// Ask to close the calling window. The answer arrives via `resolve_close`.
#[tauri::command]
pub async fn request_close(
    window: WebviewWindow,
    state: tauri::State<'_, AppState>,
) -> Result<CloseRequest, String> {
    let id = caller(&window)?;
    Ok(state.controller.request_close(id))
}

/// The user answered the close confirmation shown in the calling window.
#[tauri::command]
pub async fn resolve_close(
    window: WebviewWindow,
    state: tauri::State<'_, AppState>,
    accepted: bool,
) -> Result<WindowId, String> {
    let id = caller(&window)?;
    state
        .controller
        .confirmation_resolved_by(id, accepted)
        .ok_or_else(|| format!("Window {id} has no close confirmation showing"))
}

#[tauri::command]
pub async fn window_info(
    window: WebviewWindow,
    state: tauri::State<'_, AppState>,
) -> Result<WindowInfo, String> {
    let id = caller(&window)?;
    state
        .controller
        .window_info(id)
        .ok_or_else(|| format!("Window {id} not found"))
}

#[tauri::command]
pub async fn show_all(state: tauri::State<'_, AppState>) -> Result<usize, String> {
    Ok(state.controller.show_all())
}

#[tauri::command]
pub async fn hide_all(state: tauri::State<'_, AppState>) -> Result<usize, String> {
    Ok(state.controller.hide_all())
}

/// Fan an application event out to every window.
#[tauri::command]
pub async fn broadcast(
    state: tauri::State<'_, AppState>,
    channel: String,
    payload: serde_json::Value,
) -> Result<usize, String> {
    Ok(state.controller.broadcast(&channel, payload))
}
