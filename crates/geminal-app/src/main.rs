// Prevents additional console window on Windows in release, DO NOT REMOVE!!
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod commands;
mod config;
mod menu;
mod state;
mod surface;

use std::sync::Arc;

use geminal_core::controller::InWindowConfirmation;
use geminal_core::{event_loop, CloseRequest, CreateWindow, LifecycleController};
use geminal_pty::PtySpawner;
use state::AppState;
use surface::TauriSurfaceProvider;
use tauri::{Manager, RunEvent, WindowEvent};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();

    let config = config::load();
    log::info!(
        "starting geminal (shell: {}, level: {})",
        config.shell.as_deref().unwrap_or("$SHELL"),
        config.initial_level.as_str()
    );

    let app = tauri::Builder::default()
        .setup(move |app| {
            let (controller, events) = LifecycleController::new(
                config,
                Arc::new(PtySpawner),
                Arc::new(TauriSurfaceProvider::new(app.handle().clone())),
                Arc::new(InWindowConfirmation),
            );
            let controller = Arc::new(controller);

            let (stop_tx, stop_rx) = mpsc::channel(1);
            tauri::async_runtime::spawn(event_loop::run(
                Arc::clone(&controller),
                events,
                stop_rx,
            ));
            app.manage(AppState::new(Arc::clone(&controller), stop_tx));

            menu::build(app)?;
            controller.create_window(CreateWindow::primary())?;
            Ok(())
        })
        .on_menu_event(|app, event| menu::handle_event(app, event.id().as_ref()))
        .on_window_event(|window, event| {
            let Some(id) = surface::window_id(window.label()) else {
                return;
            };
            let Some(state) = window.try_state::<AppState>() else {
                return;
            };
            match event {
                WindowEvent::CloseRequested { api, .. } => {
                    // Closing goes through the confirmation dialog; the
                    // controller destroys the window once it is accepted.
                    if state.controller.request_close(id) != CloseRequest::NotFound {
                        api.prevent_close();
                    }
                }
                WindowEvent::Destroyed => {
                    state.controller.window_closed(id);
                }
                _ => {}
            }
        })
        .invoke_handler(tauri::generate_handler![
            commands::window::new_window,
            commands::window::terminal_input,
            commands::window::resize_window,
            commands::window::terminal_resize,
            commands::window::set_window_level,
            commands::window::request_close,
            commands::window::resolve_close,
            commands::window::window_info,
            commands::window::show_all,
            commands::window::hide_all,
            commands::window::broadcast,
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|app, event| match event {
        #[cfg(target_os = "macos")]
        RunEvent::ExitRequested { code: None, api, .. } => {
            // Stay alive with no windows so the dock icon can reopen one.
            api.prevent_exit();
        }
        #[cfg(target_os = "macos")]
        RunEvent::Reopen { .. } => {
            if let Some(state) = app.try_state::<AppState>() {
                if state.controller.window_count() == 0 {
                    if let Err(e) = state.controller.create_window(CreateWindow::primary()) {
                        log::error!("failed to reopen terminal window: {e}");
                    }
                }
            }
        }
        RunEvent::Exit => {
            if let Some(state) = app.try_state::<AppState>() {
                state.shutdown();
            }
        }
        _ => {}
    });
}

/// Install the global log subscriber. `RUST_LOG` overrides the default
/// `info` level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        eprintln!("failed to initialize logging: {e}");
    }
}
