//! The `minigalaxy-info.json` sidecar: load, save and keyed accessors.
//!
//! Layout: `{"version": "<string>", "dlcs": {"<title>": {"version": "<string>"}}}`.
//! Writes are read-modify-write with no locking; one writer is assumed.

use std::collections::BTreeSet;
use std::path::Path;

use serde_json::Value;

use crate::error::GameError;
use crate::record::GameRecord;

/// Parsed metadata file. Keys serialize in sorted order.
pub type InfoMap = serde_json::Map<String, Value>;

/// Checks a merged metadata structure before it is written.
pub trait MetadataValidator: Send + Sync {
    /// Returns `Err(reason)` to reject the structure.
    fn validate(&self, info: &InfoMap) -> Result<(), String>;
}

/// Validator that accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl MetadataValidator for AcceptAll {
    fn validate(&self, _info: &InfoMap) -> Result<(), String> {
        Ok(())
    }
}

/// Validator that only allows known top-level and per-DLC keys.
#[derive(Debug, Clone)]
pub struct KeyAllowList {
    top_level: BTreeSet<String>,
    dlc: BTreeSet<String>,
}

impl Default for KeyAllowList {
    fn default() -> Self {
        Self::new(["version", "dlcs"], ["version"])
    }
}

impl KeyAllowList {
    pub fn new<'a>(
        top_level: impl IntoIterator<Item = &'a str>,
        dlc: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            top_level: top_level.into_iter().map(str::to_string).collect(),
            dlc: dlc.into_iter().map(str::to_string).collect(),
        }
    }
}

impl MetadataValidator for KeyAllowList {
    fn validate(&self, info: &InfoMap) -> Result<(), String> {
        if let Some(key) = info.keys().find(|k| !self.top_level.contains(*k)) {
            return Err(format!("unexpected key {key:?}"));
        }

        let Some(dlcs) = info.get("dlcs") else {
            return Ok(());
        };
        let dlcs = dlcs
            .as_object()
            .ok_or_else(|| "\"dlcs\" is not an object".to_string())?;

        for (title, entry) in dlcs {
            let entry = entry
                .as_object()
                .ok_or_else(|| format!("entry for {title:?} is not an object"))?;
            if let Some(key) = entry.keys().find(|k| !self.dlc.contains(*k)) {
                return Err(format!("unexpected key {key:?} for {title:?}"));
            }
        }

        Ok(())
    }
}

/// Reads a metadata file. A missing file yields an empty map.
pub(crate) fn load_info(path: &Path) -> Result<InfoMap, GameError> {
    if !path.is_file() {
        return Ok(InfoMap::new());
    }

    let content = std::fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&content)? {
        Value::Object(map) => Ok(map),
        other => Err(GameError::Malformed {
            path: path.display().to_string(),
            reason: format!("expected a JSON object, found {}", json_kind(&other)),
        }),
    }
}

/// Writes a metadata file through a sibling temp file and a rename.
pub(crate) fn save_info(
    path: &Path,
    info: &InfoMap,
    validator: &dyn MetadataValidator,
) -> Result<(), GameError> {
    validator.validate(info).map_err(GameError::Validation)?;

    let json = serde_json::to_string_pretty(info)?;
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json)?;
    std::fs::rename(&tmp_path, path)?;

    tracing::debug!(path = %path.display(), "metadata saved");
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl GameRecord {
    /// Loads the metadata file. Missing install dir or file yields an empty map.
    pub fn load_minigalaxy_info_json(&self) -> Result<InfoMap, GameError> {
        match &self.status_file_path {
            Some(path) => load_info(path),
            None => Ok(InfoMap::new()),
        }
    }

    /// Validates and writes the metadata file.
    pub fn save_minigalaxy_info_json(&self, info: &InfoMap) -> Result<(), GameError> {
        let path = self
            .status_file_path
            .as_deref()
            .ok_or_else(|| GameError::NoInstallDir(self.name.clone()))?;
        save_info(path, info, self.validator())
    }

    /// Returns a top-level metadata value rendered as a string.
    pub fn get_info(&self, key: &str) -> Result<Option<String>, GameError> {
        let info = self.load_minigalaxy_info_json()?;
        Ok(info.get(key).and_then(value_to_string))
    }

    /// Sets a top-level metadata value, keeping every other key.
    pub fn set_info(&self, key: &str, value: &str) -> Result<(), GameError> {
        let mut info = self.load_minigalaxy_info_json()?;
        info.insert(key.to_string(), Value::String(value.to_string()));
        self.save_minigalaxy_info_json(&info)
    }

    /// Returns `dlcs[dlc_title][key]` rendered as a string.
    pub fn get_dlc_info(&self, key: &str, dlc_title: &str) -> Result<Option<String>, GameError> {
        let info = self.load_minigalaxy_info_json()?;
        Ok(info
            .get("dlcs")
            .and_then(|dlcs| dlcs.get(dlc_title))
            .and_then(|dlc| dlc.get(key))
            .and_then(value_to_string))
    }

    /// Sets `dlcs[dlc_title][key]`, creating the maps as needed.
    pub fn set_dlc_info(&self, key: &str, value: &str, dlc_title: &str) -> Result<(), GameError> {
        let mut info = self.load_minigalaxy_info_json()?;

        let mut dlcs = take_object(&mut info, "dlcs");
        let mut entry = take_object(&mut dlcs, dlc_title);
        entry.insert(key.to_string(), Value::String(value.to_string()));
        dlcs.insert(dlc_title.to_string(), Value::Object(entry));
        info.insert("dlcs".to_string(), Value::Object(dlcs));

        self.save_minigalaxy_info_json(&info)
    }
}

/// Removes `map[key]` if it is an object; anything else is replaced by an empty one.
fn take_object(map: &mut InfoMap, key: &str) -> InfoMap {
    match map.remove(key) {
        Some(Value::Object(inner)) => inner,
        _ => InfoMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn installed(dir: &Path) -> GameRecord {
        GameRecord::new("Neverwinter Nights").with_install_dir(dir)
    }

    #[test]
    fn load_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("minigalaxy-info.json"), r#"{"version": "gog-2"}"#).unwrap();

        let info = installed(tmp.path()).load_minigalaxy_info_json().unwrap();
        assert_eq!(info.get("version"), Some(&Value::String("gog-2".into())));
        assert_eq!(info.len(), 1);
    }

    #[test]
    fn load_missing_file_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let info = installed(tmp.path()).load_minigalaxy_info_json().unwrap();
        assert!(info.is_empty());

        let no_dir = GameRecord::new("Nowhere").load_minigalaxy_info_json().unwrap();
        assert!(no_dir.is_empty());
    }

    #[test]
    fn load_malformed_file_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("minigalaxy-info.json"), "not json").unwrap();
        assert!(matches!(
            installed(tmp.path()).load_minigalaxy_info_json(),
            Err(GameError::Json(_))
        ));

        std::fs::write(tmp.path().join("minigalaxy-info.json"), "[1, 2]").unwrap();
        assert!(matches!(
            installed(tmp.path()).load_minigalaxy_info_json(),
            Err(GameError::Malformed { .. })
        ));
    }

    #[test]
    fn save_writes_sorted_and_stable_output() {
        let tmp = tempfile::tempdir().unwrap();
        let game = installed(tmp.path());
        let path = tmp.path().join("minigalaxy-info.json");

        let mut info = InfoMap::new();
        info.insert("version".into(), Value::String("gog-2".into()));
        info.insert("dlcs".into(), serde_json::json!({"B": {"version": "2"}, "A": {"version": "1"}}));
        game.save_minigalaxy_info_json(&info).unwrap();
        let first = std::fs::read(&path).unwrap();

        game.save_minigalaxy_info_json(&info).unwrap();
        let second = std::fs::read(&path).unwrap();
        assert_eq!(first, second);

        let text = String::from_utf8(first).unwrap();
        assert!(text.find("\"dlcs\"").unwrap() < text.find("\"version\": \"gog-2\"").unwrap());
        assert!(text.find("\"A\"").unwrap() < text.find("\"B\"").unwrap());
        assert!(!tmp.path().join("minigalaxy-info.json.tmp").exists());
    }

    #[test]
    fn save_without_install_dir_fails() {
        let game = GameRecord::new("Nowhere");
        assert!(matches!(
            game.save_minigalaxy_info_json(&InfoMap::new()),
            Err(GameError::NoInstallDir(_))
        ));
    }

    #[test]
    fn set_info_overwrites_single_key() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("minigalaxy-info.json"),
            r#"{"version": "gog-2", "other": "kept"}"#,
        )
        .unwrap();

        let game = installed(tmp.path());
        game.set_info("version", "gog-3").unwrap();

        assert_eq!(game.get_info("version").unwrap().as_deref(), Some("gog-3"));
        assert_eq!(game.get_info("other").unwrap().as_deref(), Some("kept"));
    }

    #[test]
    fn set_dlc_info_creates_nested_maps() {
        let tmp = tempfile::tempdir().unwrap();
        let game = installed(tmp.path());
        let dlc = "Neverwinter Nights: Wyvern Crown of Cormyr";

        game.set_dlc_info("version", "82.8193.20.1", dlc).unwrap();

        let info = game.load_minigalaxy_info_json().unwrap();
        assert_eq!(
            Value::Object(info),
            serde_json::json!({"dlcs": {dlc: {"version": "82.8193.20.1"}}})
        );
    }

    #[test]
    fn set_dlc_info_preserves_siblings() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("minigalaxy-info.json"),
            r#"{"version": "1", "dlcs": {"Old": {"version": "0.9"}}}"#,
        )
        .unwrap();

        let game = installed(tmp.path());
        game.set_dlc_info("version", "2.0", "New").unwrap();

        assert_eq!(game.get_info("version").unwrap().as_deref(), Some("1"));
        assert_eq!(game.get_dlc_info("version", "Old").unwrap().as_deref(), Some("0.9"));
        assert_eq!(game.get_dlc_info("version", "New").unwrap().as_deref(), Some("2.0"));
    }

    #[test]
    fn get_info_missing_key() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("minigalaxy-info.json"),
            r#"{"dlcs": {"example_dlc": {"example_key": "example_value"}}}"#,
        )
        .unwrap();

        let game = installed(tmp.path());
        assert_eq!(game.get_info("version").unwrap(), None);
        assert_eq!(
            game.get_dlc_info("example_key", "example_dlc").unwrap().as_deref(),
            Some("example_value")
        );
        assert_eq!(game.get_dlc_info("example_key", "other_dlc").unwrap(), None);
    }

    #[test]
    fn allow_list_rejects_unknown_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let game = installed(tmp.path()).with_validator(Arc::new(KeyAllowList::default()));

        game.set_info("version", "1").unwrap();
        game.set_dlc_info("version", "1", "Expansion").unwrap();

        let err = game.set_info("example_key", "x").unwrap_err();
        assert!(matches!(err, GameError::Validation(_)));
        let err = game.set_dlc_info("size", "10", "Expansion").unwrap_err();
        assert!(matches!(err, GameError::Validation(_)));

        // Rejected writes leave the file untouched.
        assert_eq!(game.get_info("example_key").unwrap(), None);
        assert_eq!(game.get_dlc_info("version", "Expansion").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn allow_list_shape_errors() {
        let validator = KeyAllowList::default();
        let mut info = InfoMap::new();
        info.insert("dlcs".into(), Value::String("nope".into()));
        assert!(validator.validate(&info).is_err());

        info.insert("dlcs".into(), serde_json::json!({"A": "nope"}));
        assert!(validator.validate(&info).is_err());

        info.insert("dlcs".into(), serde_json::json!({"A": {"version": "1"}}));
        assert!(validator.validate(&info).is_ok());
    }
}
