//! Launcher type classification from install directory contents.

use std::fmt;
use std::path::Path;

use crate::locate::ExecutableLocator;

/// Native start script shipped by Linux installers.
pub const START_SCRIPT: &str = "start.sh";

/// Uninstaller bundled with Windows installers.
pub const UNINSTALLER: &str = "unins000.exe";

/// Launch mechanism for an install directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LauncherType {
    StartScript,
    Scummvm,
    Windows,
    Dosbox,
    FinalResort,
}

impl LauncherType {
    /// Returns the tag used in logs and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            LauncherType::StartScript => "start_script",
            LauncherType::Scummvm => "scummvm",
            LauncherType::Windows => "windows",
            LauncherType::Dosbox => "dosbox",
            LauncherType::FinalResort => "final_resort",
        }
    }
}

impl fmt::Display for LauncherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive extension check on a bare file name.
pub(crate) fn has_extension(file_name: &str, ext: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Classifies an install directory. The first matching rule wins:
///
/// 1. `start.sh` present
/// 2. `scummvm` on PATH and an `.ini` file present
/// 3. a `.exe` other than the bundled uninstaller
/// 4. `dosbox` on PATH and a `.conf` file present
/// 5. anything else
pub(crate) fn determine_launcher_type(
    files: &[String],
    locator: &dyn ExecutableLocator,
) -> LauncherType {
    let any_with = |ext: &str| files.iter().any(|f| has_extension(f, ext));

    if files.iter().any(|f| f == START_SCRIPT) {
        LauncherType::StartScript
    } else if any_with("ini") && locator.find("scummvm").is_some() {
        LauncherType::Scummvm
    } else if files
        .iter()
        .any(|f| f != UNINSTALLER && has_extension(f, "exe"))
    {
        LauncherType::Windows
    } else if any_with("conf") && locator.find("dosbox").is_some() {
        LauncherType::Dosbox
    } else {
        LauncherType::FinalResort
    }
}
