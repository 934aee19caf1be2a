//! Per-launcher command builders.

use std::path::{Path, PathBuf};

use gameshelf_game::{GameRecord, is_goggame_info};
use serde::Deserialize;

use crate::classify::{LauncherType, START_SCRIPT, has_extension};
use crate::locate::is_executable;
use crate::resolver::LauncherResolver;

/// A runnable command for one install directory. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub launcher_type: LauncherType,
    /// Program followed by its arguments. Empty when nothing is runnable.
    pub command: Vec<String>,
    /// Extra environment variables for the child.
    pub env: Vec<(String, String)>,
    pub working_dir: PathBuf,
}

impl LaunchPlan {
    /// Builds the process command, or `None` for an empty plan.
    pub fn to_command(&self) -> Option<tokio::process::Command> {
        let (program, args) = self.command.split_first()?;

        let mut cmd = tokio::process::Command::new(program);
        cmd.args(args)
            .current_dir(&self.working_dir)
            .envs(self.env.iter().cloned());
        Some(cmd)
    }
}

/// One entry of `playTasks` in a `goggame-<id>.info` file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayTask {
    #[serde(default)]
    category: String,
    #[serde(default)]
    is_primary: bool,
    path: Option<String>,
    working_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayInfo {
    #[serde(default)]
    play_tasks: Vec<PlayTask>,
}

/// Play task resolved to an absolute executable and working directory.
struct ResolvedTask {
    executable: PathBuf,
    working_dir: PathBuf,
}

/// Matches `dosbox[_]<alnum>.conf` and `dosbox[_]<alnum>_single.conf`.
fn is_dosbox_config(file_name: &str) -> bool {
    let Some(stem) = file_name
        .strip_prefix("dosbox")
        .and_then(|rest| rest.strip_suffix(".conf"))
    else {
        return false;
    };
    let stem = stem.strip_prefix('_').unwrap_or(stem);
    let stem = stem.strip_suffix("_single").unwrap_or(stem);

    !stem.is_empty() && stem.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Files that ship next to games but never are the game.
fn is_helper(file_name: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    lower.starts_with("unins")
        || lower.starts_with("uninstall")
        || has_extension(&lower, "so")
        || lower.contains(".so.")
        || has_extension(&lower, "dll")
        || has_extension(&lower, "exe")
}

fn find_play_task(dir: &Path) -> Option<ResolvedTask> {
    let mut infos: Vec<String> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| is_goggame_info(name))
        .collect();
    infos.sort();

    for name in infos {
        let info = std::fs::read_to_string(dir.join(&name))
            .map_err(|e| e.to_string())
            .and_then(|content| {
                serde_json::from_str::<PlayInfo>(&content).map_err(|e| e.to_string())
            });
        let info = match info {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!(file = %dir.join(&name).display(), error = %e, "ignoring unreadable game info");
                continue;
            }
        };

        let task = info
            .play_tasks
            .iter()
            .filter(|t| t.path.is_some())
            .find(|t| t.is_primary)
            .or_else(|| {
                info.play_tasks
                    .iter()
                    .find(|t| t.path.is_some() && t.category == "game")
            });

        if let Some(task) = task {
            let path = task.path.as_deref().unwrap_or_default();
            let working_dir = match task.working_dir.as_deref() {
                Some(wd) if !wd.is_empty() => dir.join(wd),
                _ => dir.to_path_buf(),
            };
            return Some(ResolvedTask {
                executable: dir.join(path),
                working_dir,
            });
        }
    }

    None
}

impl LauncherResolver {
    /// `[wine, <exe>]` for the most specific non-uninstaller `.exe`.
    ///
    /// Shorter names win; ties break lexicographically.
    pub fn get_windows_exe_cmd(&self, _game: &GameRecord, files: &[String]) -> Vec<String> {
        let mut candidates: Vec<&String> = files
            .iter()
            .filter(|f| has_extension(f, "exe") && !f.to_ascii_lowercase().contains("unins"))
            .collect();
        candidates.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

        match candidates.first() {
            Some(exe) => vec![self.wine_command().to_string(), exe.to_string()],
            None => Vec::new(),
        }
    }

    /// `dosbox -conf <a> -conf <b> ... -no-console -c exit`.
    ///
    /// Chains every DOSBox config in sorted order; if no file follows the
    /// DOSBox naming, every `.conf` file is chained instead.
    pub fn get_dosbox_exe_cmd(&self, _game: &GameRecord, files: &[String]) -> Vec<String> {
        let mut configs: Vec<&String> = files.iter().filter(|f| is_dosbox_config(f)).collect();
        if configs.is_empty() {
            configs = files.iter().filter(|f| has_extension(f, "conf")).collect();
        }
        configs.sort();

        let mut cmd = vec!["dosbox".to_string()];
        for config in configs {
            cmd.push("-conf".to_string());
            cmd.push(config.clone());
        }
        cmd.extend(["-no-console", "-c", "exit"].map(String::from));
        cmd
    }

    /// `scummvm -c <ini>`.
    pub fn get_scummvm_exe_cmd(&self, _game: &GameRecord, files: &[String]) -> Vec<String> {
        let ini = files.iter().filter(|f| has_extension(f, "ini")).min();

        match ini {
            Some(ini) => vec!["scummvm".to_string(), "-c".to_string(), ini.clone()],
            None => Vec::new(),
        }
    }

    /// Absolute path of `start.sh` in the install directory.
    pub fn get_start_script_exe_cmd(&self, game: &GameRecord, _files: &[String]) -> Vec<String> {
        match &game.install_dir {
            Some(dir) => vec![dir.join(START_SCRIPT).to_string_lossy().into_owned()],
            None => Vec::new(),
        }
    }

    /// Best guess when nothing else matched.
    pub fn get_final_resort_exe_cmd(&self, game: &GameRecord, files: &[String]) -> Vec<String> {
        self.final_resort_plan(game, files).command
    }

    fn final_resort_plan(&self, game: &GameRecord, files: &[String]) -> LaunchPlan {
        let mut plan = LaunchPlan {
            launcher_type: LauncherType::FinalResort,
            command: Vec::new(),
            env: Vec::new(),
            working_dir: game.install_dir.clone().unwrap_or_default(),
        };
        let Some(dir) = game.install_dir.as_deref() else {
            return plan;
        };

        // Play tasks live in `game/` for native installers, at the root otherwise.
        let task = files
            .iter()
            .any(|f| f == "game")
            .then(|| find_play_task(&dir.join("game")))
            .flatten()
            .or_else(|| find_play_task(dir));
        if let Some(task) = task {
            plan.command = vec![task.executable.to_string_lossy().into_owned()];
            plan.working_dir = task.working_dir;
            return plan;
        }

        let mut names: Vec<&String> = files.iter().filter(|f| !is_helper(f)).collect();
        names.sort();
        if let Some(exe) = names.into_iter().find(|f| is_executable(&dir.join(f))) {
            plan.command = vec![dir.join(exe).to_string_lossy().into_owned()];
        }
        plan
    }

    /// Dispatches to the builder for `launcher_type`.
    pub fn get_execute_command(
        &self,
        game: &GameRecord,
        launcher_type: LauncherType,
        files: &[String],
    ) -> Vec<String> {
        match launcher_type {
            LauncherType::StartScript => self.get_start_script_exe_cmd(game, files),
            LauncherType::Scummvm => self.get_scummvm_exe_cmd(game, files),
            LauncherType::Windows => self.get_windows_exe_cmd(game, files),
            LauncherType::Dosbox => self.get_dosbox_exe_cmd(game, files),
            LauncherType::FinalResort => self.get_final_resort_exe_cmd(game, files),
        }
    }

    /// Full plan: command, environment and working directory.
    pub fn launch_plan(
        &self,
        game: &GameRecord,
        launcher_type: LauncherType,
        files: &[String],
    ) -> LaunchPlan {
        if launcher_type == LauncherType::FinalResort {
            return self.final_resort_plan(game, files);
        }

        let install_dir = game.install_dir.clone().unwrap_or_default();
        let mut env = Vec::new();
        if launcher_type == LauncherType::Windows {
            env.push((
                "WINEPREFIX".to_string(),
                install_dir.join("prefix").to_string_lossy().into_owned(),
            ));
        }

        LaunchPlan {
            launcher_type,
            command: self.get_execute_command(game, launcher_type, files),
            env,
            working_dir: install_dir,
        }
    }
}
