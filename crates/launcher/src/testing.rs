//! Test doubles for the resolver's collaborators.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::LaunchError;
use crate::locate::ExecutableLocator;
use crate::process::ProcessLister;
use crate::resolver::LauncherResolver;

/// Locator that knows a fixed set of programs.
pub struct FakeLocator(pub Vec<&'static str>);

impl ExecutableLocator for FakeLocator {
    fn find(&self, program: &str) -> Option<PathBuf> {
        self.0
            .iter()
            .any(|known| *known == program)
            .then(|| PathBuf::from("/usr/bin").join(program))
    }
}

/// Process lister returning a canned `ps -ef` dump.
pub struct FakeProcesses {
    pub table: Option<String>,
    pub own_pid: u32,
}

impl ProcessLister for FakeProcesses {
    fn list(&self) -> Pin<Box<dyn Future<Output = Result<String, LaunchError>> + Send + '_>> {
        Box::pin(async move {
            self.table
                .clone()
                .ok_or_else(|| LaunchError::ProcessList("no mock table".into()))
        })
    }

    fn own_pid(&self) -> u32 {
        self.own_pid
    }
}

/// Resolver with the given programs on the fake PATH and an empty process table.
pub fn resolver_with(programs: Vec<&'static str>) -> LauncherResolver {
    LauncherResolver::new()
        .with_locator(Arc::new(FakeLocator(programs)))
        .with_process_lister(Arc::new(FakeProcesses {
            table: Some(String::new()),
            own_pid: 1000,
        }))
}

/// Turns string literals into an owned file list.
pub fn files(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}
