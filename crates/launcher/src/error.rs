//! Launch error types.

/// Errors produced while launching a game.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("No executable was found in {0}")]
    NoExecutable(String),

    #[error("{0} has no install directory")]
    NoInstallDir(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The game did not come up; carries the captured error output.
    #[error("{0}")]
    Startup(String),

    #[error("process listing failed: {0}")]
    ProcessList(String),
}
