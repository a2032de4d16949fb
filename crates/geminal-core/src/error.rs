//! Error types shared across the lifecycle core.

use thiserror::Error;

use crate::surface::WindowId;

/// Errors from the window registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The window key is already present. This is a caller bug; it aborts
    /// only the offending registration.
    #[error("window {0} is already registered")]
    DuplicateWindow(WindowId),
}

/// Errors reported by a shell-session provider.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session spawn failed: {0}")]
    Spawn(String),
    #[error("session write failed: {0}")]
    Write(String),
    #[error("session resize failed: {0}")]
    Resize(String),
    #[error("session kill failed: {0}")]
    Kill(String),
    #[error("session output is already subscribed")]
    AlreadySubscribed,
}

/// Errors reported by the window surface provider.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("window creation failed: {0}")]
    Create(String),
    #[error("window operation failed: {0}")]
    Operation(String),
}

/// Window creation failed. Nothing was left registered and no session
/// survives the failure.
#[derive(Debug, Error)]
pub enum CreationError {
    #[error("failed to spawn shell session: {0}")]
    Session(#[source] SessionError),
    #[error("failed to create window surface: {0}")]
    Surface(#[source] SurfaceError),
    #[error("failed to subscribe to session output: {0}")]
    Subscribe(#[source] SessionError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
