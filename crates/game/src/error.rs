//! Error types for game record operations.

/// Errors produced while reading or writing installed game state.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed metadata in {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("{0} has no install directory")]
    NoInstallDir(String),

    #[error("configuration key not set: {0}")]
    Config(String),

    #[error("metadata rejected: {0}")]
    Validation(String),
}
