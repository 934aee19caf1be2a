//! Spawning games and checking that they came up.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use gameshelf_game::GameRecord;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStderr};
use tokio::task::JoinHandle;

use crate::error::LaunchError;
use crate::process::{ProcessEntry, parse_process_table};
use crate::resolver::LauncherResolver;

/// Upper bound for draining stderr of an exited launcher.
///
/// A grandchild can keep the pipe open long after the launcher is gone.
const STDERR_DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

static CWD_LOCK: Mutex<()> = Mutex::new(());

/// Changes the process working directory until dropped.
///
/// The working directory is process-wide, so guards are serialized through a
/// global lock held for the guard's lifetime.
#[derive(Debug)]
pub struct WorkingDirGuard {
    previous: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl WorkingDirGuard {
    pub fn enter(dir: &Path) -> std::io::Result<Self> {
        let lock = CWD_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = std::env::current_dir()?;
        std::env::set_current_dir(dir)?;
        Ok(Self {
            previous,
            _lock: lock,
        })
    }

    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.previous) {
            tracing::warn!(
                path = %self.previous.display(),
                error = %e,
                "failed to restore working directory"
            );
        }
    }
}

/// Top-level entry names of `dir`, sorted.
pub fn list_install_files(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

/// Logs the child's stderr line by line in the background.
///
/// Returns `None` when stderr was not piped or was already taken.
pub fn forward_stderr(child: &mut Child, game_name: &str) -> Option<JoinHandle<()>> {
    let stderr = child.stderr.take()?;
    let game_name = game_name.to_string();

    Some(tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => tracing::info!(game = %game_name, "{line}"),
                Ok(None) => break,
                Err(e) => {
                    tracing::debug!(game = %game_name, error = %e, "stderr closed");
                    break;
                }
            }
        }
    }))
}

/// Stderr collected after the launcher exited.
struct DrainedStderr {
    text: String,
    /// Read end, when a descendant still holds the pipe open.
    open: Option<ChildStderr>,
}

/// Reads stderr until EOF or [`STDERR_DRAIN_TIMEOUT`].
///
/// On timeout the pipe is handed back instead of dropped: a re-spawned game
/// writing into a closed pipe would be killed by `SIGPIPE`.
async fn drain_stderr(child: &mut Child) -> DrainedStderr {
    let Some(mut pipe) = child.stderr.take() else {
        return DrainedStderr {
            text: String::new(),
            open: None,
        };
    };

    let deadline = tokio::time::Instant::now() + STDERR_DRAIN_TIMEOUT;
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let open = loop {
        match tokio::time::timeout_at(deadline, pipe.read(&mut chunk)).await {
            Ok(Ok(0)) => break None,
            Ok(Ok(n)) => buf.extend_from_slice(&chunk[..n]),
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "stderr read failed");
                break None;
            }
            Err(_) => {
                tracing::debug!("stderr still open after launcher exit");
                break Some(pipe);
            }
        }
    };

    DrainedStderr {
        text: String::from_utf8_lossy(&buf).trim_end().to_string(),
        open,
    }
}

/// `own_pid` and every ancestor of it found in the table.
fn own_lineage(entries: &[ProcessEntry], own_pid: u32) -> HashSet<u32> {
    let parents: HashMap<u32, u32> = entries.iter().map(|p| (p.pid, p.ppid)).collect();

    let mut lineage = HashSet::from([own_pid]);
    let mut pid = own_pid;
    while let Some(&ppid) = parents.get(&pid) {
        if ppid == 0 || !lineage.insert(ppid) {
            break;
        }
        pid = ppid;
    }
    lineage
}

impl LauncherResolver {
    /// Classifies the install directory and spawns the game from inside it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run_game_subprocess(&self, game: &GameRecord) -> Result<Child, LaunchError> {
        let install_dir = game
            .install_dir
            .as_deref()
            .ok_or_else(|| LaunchError::NoInstallDir(game.name.clone()))?;
        let no_executable = || LaunchError::NoExecutable(install_dir.display().to_string());

        let absolute = std::path::absolute(install_dir)?;
        let game = game.clone().with_install_dir(&absolute);

        let files = match list_install_files(&absolute) {
            Ok(files) => files,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(no_executable()),
            Err(e) => return Err(e.into()),
        };
        let launcher_type = self.determine_launcher_type(&files);
        let plan = self.launch_plan(&game, launcher_type, &files);

        let Some(mut cmd) = plan.to_command() else {
            tracing::warn!(game = %game.name, launcher = %launcher_type, "no runnable file found");
            return Err(no_executable());
        };
        cmd.stdin(Stdio::null()).stderr(Stdio::piped());

        let _cwd = WorkingDirGuard::enter(&absolute)?;
        tracing::info!(
            game = %game.name,
            launcher = %launcher_type,
            command = ?plan.command,
            "launching game"
        );

        match cmd.spawn() {
            Ok(child) => Ok(child),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(program = %plan.command[0], "launcher program not found");
                Err(no_executable())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Waits up to the startup timeout and decides whether the game is up.
    ///
    /// A child still running at the deadline counts as started. So does an
    /// exited launcher whose game shows up in the process table. In both
    /// cases stderr stays on `child` for [`forward_stderr`] as long as some
    /// process still writes to it.
    pub async fn check_if_game_started_correctly(
        &self,
        child: &mut Child,
        game: &GameRecord,
    ) -> Result<(), LaunchError> {
        let status = match tokio::time::timeout(self.startup_timeout(), child.wait()).await {
            Err(_) => {
                tracing::debug!(game = %game.name, "game still running after startup timeout");
                return Ok(());
            }
            Ok(status) => status?,
        };

        let stderr = drain_stderr(child).await;
        let still_open = stderr.open.is_some();
        // Nothing left holds the pipe, so the output is the launcher's alone.
        if !still_open && !stderr.text.is_empty() {
            return Err(LaunchError::Startup(stderr.text));
        }

        let seed = if !stderr.text.is_empty() {
            stderr.text.clone()
        } else if status.success() {
            String::new()
        } else {
            format!("{} exited with {status}", game.name)
        };
        let err_msg = self
            .check_if_game_start_process_spawned_final_process(&seed, game)
            .await;

        if !err_msg.is_empty() {
            return Err(LaunchError::Startup(err_msg));
        }

        for line in stderr.text.lines() {
            tracing::info!(game = %game.name, "{line}");
        }
        child.stderr = stderr.open;
        Ok(())
    }

    /// Looks for a game process re-spawned by a short-lived launcher.
    ///
    /// Returns an empty string when some other process mentions the install
    /// directory or the game name, `err_msg` otherwise. Our own process and
    /// its ancestors never count: a wrapper such as `time gameshelf launch X`
    /// names the game too.
    pub async fn check_if_game_start_process_spawned_final_process(
        &self,
        err_msg: &str,
        game: &GameRecord,
    ) -> String {
        let table = match self.processes().list().await {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!(error = %e, "could not list processes");
                return err_msg.to_string();
            }
        };

        let entries = parse_process_table(&table);
        let excluded = own_lineage(&entries, self.processes().own_pid());
        let install_dir = game
            .install_dir
            .as_deref()
            .map(|d| d.to_string_lossy().into_owned())
            .filter(|d| !d.is_empty());

        let found = entries
            .iter()
            .filter(|p| !excluded.contains(&p.pid))
            .find(|p| {
                install_dir.as_deref().is_some_and(|d| p.command.contains(d))
                    || (!game.name.is_empty() && p.command.contains(&game.name))
            });

        match found {
            Some(p) => {
                tracing::info!(game = %game.name, pid = p.pid, "found spawned game process");
                String::new()
            }
            None => err_msg.to_string(),
        }
    }
}
