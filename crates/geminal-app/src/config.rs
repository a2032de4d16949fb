//! Controller configuration overlaid from the settings database.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use geminal_core::ControllerConfig;
use rusqlite::Connection;

pub const DEFAULT_SHELL: &str = "default_shell";
pub const WORKING_DIR: &str = "working_dir";
pub const TERM_NAME: &str = "term_name";
pub const INITIAL_LEVEL: &str = "initial_level";
pub const WINDOW_WIDTH: &str = "window_width";
pub const WINDOW_HEIGHT: &str = "window_height";
pub const COLOR_HISTORY: &str = "color_history";

/// `~/.geminal/geminal.db`
pub fn database_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .map(|home| home.join(".geminal").join("geminal.db"))
}

/// Load the configuration, falling back to defaults when the database is
/// unavailable.
pub fn load() -> ControllerConfig {
    let Some(path) = database_path() else {
        log::warn!("no home directory; using default settings");
        return ControllerConfig::default();
    };
    if let Some(dir) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(dir) {
            log::warn!("cannot create {}: {e}; using default settings", dir.display());
            return ControllerConfig::default();
        }
    }
    match geminal_db::open(&path) {
        Ok(conn) => from_settings(&conn),
        Err(e) => {
            log::warn!("cannot open {}: {e}; using default settings", path.display());
            ControllerConfig::default()
        }
    }
}

/// Apply every stored setting on top of the defaults. Unusable values are
/// skipped with a warning.
pub fn from_settings(conn: &Connection) -> ControllerConfig {
    let mut config = ControllerConfig::default();

    if let Some(shell) = setting(conn, DEFAULT_SHELL) {
        config.shell = Some(shell);
    }
    if let Some(dir) = setting(conn, WORKING_DIR) {
        config.working_dir = Some(PathBuf::from(dir));
    }
    if let Some(term) = setting(conn, TERM_NAME) {
        config.term = term;
    }
    if let Some(level) = parsed(conn, INITIAL_LEVEL) {
        config.initial_level = level;
    }
    if let Some(width) = parsed::<u32>(conn, WINDOW_WIDTH) {
        config.window_width = width.max(config.limits.min_width);
    }
    if let Some(height) = parsed::<u32>(conn, WINDOW_HEIGHT) {
        config.window_height = height.max(config.limits.min_height);
    }
    if let Some(history) = parsed(conn, COLOR_HISTORY) {
        config.color_history = history;
    }

    config
}

fn setting(conn: &Connection, key: &str) -> Option<String> {
    match geminal_db::settings::get(conn, key) {
        Ok(value) => value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()),
        Err(e) => {
            log::warn!("failed to read setting {key}: {e}");
            None
        }
    }
}

fn parsed<T>(conn: &Connection, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = setting(conn, key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("ignoring setting {key}={raw:?}: {e}");
            None
        }
    }
}
