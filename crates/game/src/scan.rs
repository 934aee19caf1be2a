//! Discovery of installed games under the games root.

use std::path::Path;

use serde::Deserialize;

use crate::error::GameError;
use crate::legacy::GameInfoFile;
use crate::record::GameRecord;
use crate::GAMEINFO_FILE_NAME;

/// Subset of a `goggame-<id>.info` file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GogGameInfo {
    name: String,
    #[serde(default)]
    game_id: Option<String>,
}

/// Lists installed games found directly under `root`.
///
/// A sub-directory counts as a game when it holds a `gameinfo` file or a
/// `goggame-<id>.info` file. A missing root yields an empty list.
pub fn scan_installed_games(root: &Path) -> Result<Vec<GameRecord>, GameError> {
    if !root.is_dir() {
        tracing::debug!(root = %root.display(), "games root does not exist");
        return Ok(Vec::new());
    }

    let mut games = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        match read_game_dir(&path) {
            Ok(Some(game)) => games.push(game),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(dir = %path.display(), error = %e, "skipping unreadable install directory");
            }
        }
    }

    games.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(games)
}

fn read_game_dir(dir: &Path) -> Result<Option<GameRecord>, GameError> {
    let mut game = if let Some(info) = GameInfoFile::load(&dir.join(GAMEINFO_FILE_NAME))? {
        let mut game = GameRecord::new(info.name).with_install_dir(dir);
        game.store_id = info.store_id;
        game
    } else if let Some(info) = read_goggame_info(dir)? {
        let mut game = GameRecord::new(info.name).with_install_dir(dir);
        game.store_id = info.game_id.and_then(|id| id.parse().ok());
        game
    } else {
        return Ok(None);
    };

    game.installed_version = game.installed_version()?;
    Ok(Some(game))
}

fn read_goggame_info(dir: &Path) -> Result<Option<GogGameInfo>, GameError> {
    let mut candidates: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| is_goggame_info(name))
        .collect();
    candidates.sort();

    let Some(file_name) = candidates.first() else {
        return Ok(None);
    };

    let content = std::fs::read_to_string(dir.join(file_name))?;
    Ok(Some(serde_json::from_str(&content)?))
}

/// Matches `goggame-<digits>.info`.
pub fn is_goggame_info(file_name: &str) -> bool {
    file_name
        .strip_prefix("goggame-")
        .and_then(|rest| rest.strip_suffix(".info"))
        .is_some_and(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goggame_info_names() {
        assert!(is_goggame_info("goggame-1207658671.info"));
        assert!(!is_goggame_info("goggame-1207658671.hashdb"));
        assert!(!is_goggame_info("goggame-.info"));
        assert!(!is_goggame_info("goggame-abc.info"));
    }

    #[test]
    fn scan_missing_root() {
        let tmp = tempfile::tempdir().unwrap();
        let games = scan_installed_games(&tmp.path().join("nope")).unwrap();
        assert!(games.is_empty());
    }

    #[test]
    fn scan_finds_native_and_windows_games() {
        let tmp = tempfile::tempdir().unwrap();

        let native = tmp.path().join("Beneath A Steel Sky");
        std::fs::create_dir(&native).unwrap();
        std::fs::write(
            native.join("gameinfo"),
            "Beneath A Steel Sky\ngog-2\n20150\nen-US\n1207658695\n",
        )
        .unwrap();

        let windows = tmp.path().join("Stonekeep");
        std::fs::create_dir(&windows).unwrap();
        std::fs::write(
            windows.join("goggame-1207658671.info"),
            r#"{"gameId": "1207658671", "name": "Stonekeep", "playTasks": []}"#,
        )
        .unwrap();
        std::fs::write(windows.join("minigalaxy-info.json"), r#"{"version": "1.0"}"#).unwrap();

        std::fs::create_dir(tmp.path().join("Random Folder")).unwrap();
        std::fs::write(tmp.path().join("loose-file.txt"), "x").unwrap();

        let games = scan_installed_games(tmp.path()).unwrap();
        assert_eq!(games.len(), 2);

        assert_eq!(games[0].name, "Beneath A Steel Sky");
        assert_eq!(games[0].store_id, Some(1207658695));
        assert_eq!(games[0].installed_version, "gog-2");
        assert_eq!(games[0].install_dir.as_deref(), Some(native.as_path()));

        assert_eq!(games[1].name, "Stonekeep");
        assert_eq!(games[1].store_id, Some(1207658671));
        assert_eq!(games[1].installed_version, "1.0");
    }

    #[test]
    fn scan_skips_malformed_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let broken = tmp.path().join("Broken");
        std::fs::create_dir(&broken).unwrap();
        std::fs::write(broken.join("goggame-1.info"), "{not json").unwrap();

        let games = scan_installed_games(tmp.path()).unwrap();
        assert!(games.is_empty());
    }
}
