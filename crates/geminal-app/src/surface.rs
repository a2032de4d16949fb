//! Window surfaces backed by Tauri webview windows.

use std::sync::Arc;

use geminal_core::{
    Bounds, DisplayEvent, StackingConfig, SurfaceError, WindowConfig, WindowId, WindowSurface,
    WindowSurfaceProvider, WorkArea,
};
use tauri::{
    AppHandle, Emitter, EventTarget, PhysicalPosition, PhysicalSize, WebviewUrl, WebviewWindow,
    WebviewWindowBuilder,
};

const LABEL_PREFIX: &str = "terminal-";

/// The Tauri label of a terminal window.
pub fn label_for(id: WindowId) -> String {
    format!("{LABEL_PREFIX}{id}")
}

/// Recover the window id from a Tauri label; `None` for windows we don't own.
pub fn window_id(label: &str) -> Option<WindowId> {
    label
        .strip_prefix(LABEL_PREFIX)
        .and_then(|rest| rest.parse().ok())
        .map(WindowId)
}

fn op_err(e: tauri::Error) -> SurfaceError {
    SurfaceError::Operation(e.to_string())
}

pub struct TauriSurface {
    window: WebviewWindow,
}

impl WindowSurface for TauriSurface {
    fn set_bounds(&self, bounds: Bounds) -> Result<(), SurfaceError> {
        self.window
            .set_position(PhysicalPosition::new(bounds.x, bounds.y))
            .map_err(op_err)?;
        self.window
            .set_size(PhysicalSize::new(bounds.width, bounds.height))
            .map_err(op_err)
    }

    fn work_area(&self) -> Option<WorkArea> {
        let monitor = self.window.current_monitor().ok().flatten()?;
        let area = monitor.work_area();
        Some(WorkArea {
            x: area.position.x,
            y: area.position.y,
            width: area.size.width,
            height: area.size.height,
        })
    }

    fn set_stacking(&self, config: StackingConfig) -> Result<(), SurfaceError> {
        // Clear before set so the window is never pinned both ways at once.
        if !config.always_on_top {
            self.window.set_always_on_top(false).map_err(op_err)?;
        }
        if !config.always_on_bottom {
            self.window.set_always_on_bottom(false).map_err(op_err)?;
        }
        if config.always_on_top {
            self.window.set_always_on_top(true).map_err(op_err)?;
        }
        if config.always_on_bottom {
            self.window.set_always_on_bottom(true).map_err(op_err)?;
        }
        self.window
            .set_visible_on_all_workspaces(config.all_workspaces)
            .map_err(op_err)
    }

    fn show(&self) -> Result<(), SurfaceError> {
        self.window.show().map_err(op_err)
    }

    fn hide(&self) -> Result<(), SurfaceError> {
        self.window.hide().map_err(op_err)
    }

    fn focus(&self) -> Result<(), SurfaceError> {
        self.window.set_focus().map_err(op_err)
    }

    fn destroy(&self) -> Result<(), SurfaceError> {
        self.window.destroy().map_err(op_err)
    }

    fn send(&self, event: &DisplayEvent) -> Result<(), SurfaceError> {
        let target = EventTarget::webview_window(self.window.label());
        let result = match event {
            DisplayEvent::Broadcast { channel, payload } => {
                self.window.emit_to(target, channel, payload.clone())
            }
            other => self.window.emit_to(target, other.channel(), other.clone()),
        };
        result.map_err(op_err)
    }
}

/// Opens frameless, transparent terminal windows.
pub struct TauriSurfaceProvider {
    app: AppHandle,
}

impl TauriSurfaceProvider {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl WindowSurfaceProvider for TauriSurfaceProvider {
    fn create(
        &self,
        id: WindowId,
        config: &WindowConfig,
    ) -> Result<Arc<dyn WindowSurface>, SurfaceError> {
        let label = label_for(id);
        let title = if config.primary {
            "geminal".to_string()
        } else {
            format!("geminal {id}")
        };

        let mut builder =
            WebviewWindowBuilder::new(&self.app, &label, WebviewUrl::App("index.html".into()))
                .title(title)
                .inner_size(f64::from(config.width), f64::from(config.height))
                .decorations(false)
                .transparent(true)
                .shadow(false);
        builder = match config.position {
            Some((x, y)) => builder.position(f64::from(x), f64::from(y)),
            None => builder.center(),
        };

        let window = builder
            .build()
            .map_err(|e| SurfaceError::Create(format!("{label}: {e}")))?;
        Ok(Arc::new(TauriSurface { window }))
    }
}
