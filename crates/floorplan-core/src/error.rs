//! Error types for editing, layout files and configuration.

use thiserror::Error;

/// A rejected editing operation. The `Display` text is shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("Object is on a hidden or locked layer")]
    ObjectNotEditable,
    #[error("Active layer is hidden or locked")]
    ActiveLayerNotEditable,
    #[error("Cannot delete the last layer")]
    LastLayer,
    #[error("Layer not found")]
    LayerNotFound,
    #[error("Object not found")]
    ObjectNotFound,
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error("Nothing to redo")]
    NothingToRedo,
    #[error("Clipboard is empty")]
    EmptyClipboard,
    #[error("Nothing selected")]
    NothingSelected,
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),
}

/// Failure to read or write a layout document.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Malformed layout: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported layout version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// Invalid editor configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Malformed config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
