//! Error types for devhub
//!
//! Centralized error handling using thiserror. Most widget-level failures
//! never reach this type: they are reported inline as a `ToolOutput`.

use thiserror::Error;

/// All error types that can occur in devhub
#[derive(Debug, Error)]
pub enum DevhubError {
    /// Tool id not present in the catalog
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool exists but is marked as not enabled
    #[error("Tool disabled: {0}")]
    ToolDisabled(String),

    /// Invalid controller state transition or operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Key-value storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Tool catalog could not be loaded or parsed
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// External diagram renderer failed or is missing
    #[error("Render error: {0}")]
    Render(String),

    /// Columnar decoder failed
    #[error("Decode error: {0}")]
    Decode(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for devhub operations
pub type Result<T> = std::result::Result<T, DevhubError>;
