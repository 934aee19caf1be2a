//! Resolver holding the injected collaborators and launch settings.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::classify::{self, LauncherType};
use crate::locate::{ExecutableLocator, SearchPath};
use crate::process::{ProcessLister, PsProcessLister};

/// Wine binary used for Windows games.
pub const DEFAULT_WINE_COMMAND: &str = "wine";

/// How long a freshly spawned game must survive to count as started.
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(3);

/// Picks, builds, spawns and verifies game launches.
#[derive(Clone)]
pub struct LauncherResolver {
    locator: Arc<dyn ExecutableLocator>,
    processes: Arc<dyn ProcessLister>,
    wine_command: String,
    startup_timeout: Duration,
}

impl fmt::Debug for LauncherResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LauncherResolver")
            .field("wine_command", &self.wine_command)
            .field("startup_timeout", &self.startup_timeout)
            .finish_non_exhaustive()
    }
}

impl Default for LauncherResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl LauncherResolver {
    /// Resolver backed by `$PATH` and `ps -ef`.
    pub fn new() -> Self {
        Self {
            locator: Arc::new(SearchPath::from_env()),
            processes: Arc::new(PsProcessLister),
            wine_command: DEFAULT_WINE_COMMAND.to_string(),
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
        }
    }

    pub fn with_locator(mut self, locator: Arc<dyn ExecutableLocator>) -> Self {
        self.locator = locator;
        self
    }

    pub fn with_process_lister(mut self, processes: Arc<dyn ProcessLister>) -> Self {
        self.processes = processes;
        self
    }

    pub fn with_wine_command(mut self, wine: impl Into<String>) -> Self {
        self.wine_command = wine.into();
        self
    }

    pub fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }

    pub fn wine_command(&self) -> &str {
        &self.wine_command
    }

    pub fn startup_timeout(&self) -> Duration {
        self.startup_timeout
    }

    pub(crate) fn processes(&self) -> &dyn ProcessLister {
        self.processes.as_ref()
    }

    /// Classifies an install directory from its top-level file names.
    pub fn determine_launcher_type(&self, files: &[String]) -> LauncherType {
        classify::determine_launcher_type(files, self.locator.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{files, resolver_with};

    #[test]
    fn defaults() {
        let resolver = LauncherResolver::new();
        assert_eq!(resolver.wine_command(), "wine");
        assert_eq!(resolver.startup_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn builders_override_settings() {
        let resolver = LauncherResolver::default()
            .with_wine_command("wine64")
            .with_startup_timeout(Duration::from_millis(250));
        assert_eq!(resolver.wine_command(), "wine64");
        assert_eq!(resolver.startup_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn classification_uses_injected_locator() {
        let names = files(&["beneath.ini", "data"]);
        assert_eq!(
            resolver_with(vec!["scummvm"]).determine_launcher_type(&names),
            LauncherType::Scummvm
        );
        assert_eq!(
            resolver_with(vec![]).determine_launcher_type(&names),
            LauncherType::FinalResort
        );
    }
}
