//! Native menu bar.

use tauri::menu::{MenuBuilder, MenuItemBuilder, SubmenuBuilder};
use tauri::{AppHandle, Manager};

use geminal_core::CreateWindow;

use crate::state::AppState;

pub const NEW_TERMINAL: &str = "new-terminal";
pub const SHOW_ALL: &str = "show-all";
pub const HIDE_ALL: &str = "hide-all";

/// Build the native menu bar.
pub fn build(app: &mut tauri::App) -> Result<(), Box<dyn std::error::Error>> {
    let handle = app.handle();

    let app_menu = SubmenuBuilder::new(handle, "geminal")
        .about(None)
        .separator()
        .quit()
        .build()?;

    let new_terminal = MenuItemBuilder::with_id(NEW_TERMINAL, "New Terminal")
        .accelerator("CmdOrCtrl+N")
        .build(handle)?;

    let file_menu = SubmenuBuilder::new(handle, "File")
        .item(&new_terminal)
        .build()?;

    let edit_menu = SubmenuBuilder::new(handle, "Edit")
        .undo()
        .redo()
        .separator()
        .cut()
        .copy()
        .paste()
        .select_all()
        .build()?;

    let show_all = MenuItemBuilder::with_id(SHOW_ALL, "Show All").build(handle)?;
    let hide_all = MenuItemBuilder::with_id(HIDE_ALL, "Hide All").build(handle)?;

    let window_menu = SubmenuBuilder::new(handle, "Window")
        .minimize()
        .separator()
        .item(&show_all)
        .item(&hide_all)
        .build()?;

    let menu = MenuBuilder::new(handle)
        .item(&app_menu)
        .item(&file_menu)
        .item(&edit_menu)
        .item(&window_menu)
        .build()?;

    app.set_menu(menu)?;

    Ok(())
}

pub fn handle_event(app: &AppHandle, id: &str) {
    let Some(state) = app.try_state::<AppState>() else {
        return;
    };
    match id {
        NEW_TERMINAL => {
            if let Err(e) = state.controller.create_window(CreateWindow::secondary()) {
                log::error!("failed to open terminal window: {e}");
            }
        }
        SHOW_ALL => {
            state.controller.show_all();
        }
        HIDE_ALL => {
            state.controller.hide_all();
        }
        _ => {}
    }
}
