//! Window geometry and work-area clamping.

use serde::{Deserialize, Serialize};

/// Outer window bounds in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Usable region of a display (excludes docks, menu bars and taskbars).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkArea {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Size and visibility limits applied to every geometry update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometryLimits {
    pub min_width: u32,
    pub min_height: u32,
    /// Width that must stay inside the work area when dragged off an edge.
    pub min_visible_width: u32,
    /// Height that must stay inside the work area at the bottom edge.
    pub min_visible_height: u32,
}

impl Default for GeometryLimits {
    fn default() -> Self {
        Self {
            min_width: 300,
            min_height: 200,
            min_visible_width: 100,
            min_visible_height: 50,
        }
    }
}

/// Clamp `requested` so the window keeps a usable region on `work_area`.
///
/// The size is raised to the limits' minimum; horizontally at least
/// `min_visible_width` stays on screen at either edge; vertically the top
/// edge stays inside the work area and at least `min_visible_height` stays
/// above its bottom. Clamping an already clamped rectangle is a no-op.
pub fn clamp_bounds(requested: Bounds, work_area: WorkArea, limits: &GeometryLimits) -> Bounds {
    let width = requested.width.max(limits.min_width);
    let height = requested.height.max(limits.min_height);

    let visible_w = i64::from(limits.min_visible_width.min(width));
    let visible_h = i64::from(limits.min_visible_height.min(height));

    let wa_x = i64::from(work_area.x);
    let wa_y = i64::from(work_area.y);

    let x_min = wa_x + visible_w - i64::from(width);
    let x_max = wa_x + i64::from(work_area.width) - visible_w;
    let y_min = wa_y;
    let y_max = wa_y + i64::from(work_area.height) - visible_h;

    // On a work area smaller than the visible minimum the lower bound wins.
    let x = i64::from(requested.x).min(x_max).max(x_min);
    let y = i64::from(requested.y).min(y_max).max(y_min);

    Bounds {
        x: saturate(x),
        y: saturate(y),
        width,
        height,
    }
}

fn saturate(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
