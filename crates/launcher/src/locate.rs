//! Executable lookup on the search path.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Resolves program names to executables, like `which`.
pub trait ExecutableLocator: Send + Sync {
    /// Returns the full path of `program`, if it can be executed.
    fn find(&self, program: &str) -> Option<PathBuf>;
}

/// Looks programs up in a `PATH`-style directory list.
#[derive(Debug, Clone, Default)]
pub struct SearchPath {
    path: Option<OsString>,
}

impl SearchPath {
    /// Uses the current process `PATH`.
    pub fn from_env() -> Self {
        Self {
            path: std::env::var_os("PATH"),
        }
    }

    /// Uses a custom directory list (`:`-separated on Unix).
    pub fn new(path: impl Into<OsString>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }
}

impl ExecutableLocator for SearchPath {
    fn find(&self, program: &str) -> Option<PathBuf> {
        let path = self.path.as_ref()?;
        std::env::split_paths(path)
            .map(|dir| dir.join(program))
            .find(|candidate| is_executable(candidate))
    }
}

/// Returns true for regular files with an execute bit (any file off Unix).
pub(crate) fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}
