//! Launch mechanism detection, command building and start verification.
//!
//! Given the files of an install directory, [`LauncherResolver`] picks one
//! of the launch mechanisms in [`LauncherType`], builds its command line,
//! spawns it and checks that a real game process came out of it.
//!
//! # Collaborators
//!
//! - [`ExecutableLocator`]: PATH probe used for `scummvm` / `dosbox`
//! - [`ProcessLister`]: process table used to find games re-spawned by a
//!   short-lived launcher

mod classify;
mod command;
mod error;
mod locate;
mod process;
mod resolver;
mod run;

#[cfg(test)]
mod testing;

pub use classify::{LauncherType, START_SCRIPT, UNINSTALLER};
pub use command::LaunchPlan;
pub use error::LaunchError;
pub use locate::{ExecutableLocator, SearchPath};
pub use process::{ProcessEntry, ProcessLister, PsProcessLister, parse_process_table};
pub use resolver::{DEFAULT_STARTUP_TIMEOUT, DEFAULT_WINE_COMMAND, LauncherResolver};
pub use run::{WorkingDirGuard, forward_stderr, list_install_files};
