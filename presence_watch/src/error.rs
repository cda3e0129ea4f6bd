//! Error types for presence_watch operations.

use std::path::PathBuf;

use crate::core_modules::observation::ResultCategory;

/// Boxed error returned by injected collaborators (capture, detection, rendering).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All errors that can occur while building or running a presence monitor.
#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("{name} must be a positive duration")]
    NonPositiveDuration { name: &'static str },

    #[error("asset pool for {category:?} is empty")]
    EmptyAssetPool { category: ResultCategory },

    #[error("cannot enumerate assets in {path}: {source}")]
    AssetDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Acquisition Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("frame capture failed: {0}")]
    Capture(#[source] BoxError),

    #[error("subject detection failed: {0}")]
    Detection(#[source] BoxError),

    #[error("render failed: {0}")]
    Render(#[source] BoxError),
}

impl PresenceError {
    /// Configuration errors are raised at construction and never reach the run loop.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PresenceError::NonPositiveDuration { .. }
                | PresenceError::EmptyAssetPool { .. }
                | PresenceError::AssetDirectory { .. }
        )
    }
}
