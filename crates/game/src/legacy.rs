//! Readers for on-disk layouts that predate `minigalaxy-info.json`.

use std::collections::BTreeMap;
use std::path::Path;

use crate::dlc::DlcStatus;
use crate::error::GameError;

/// Legacy DLC bookkeeping: `[{title: status}, {title: version}]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyDlcFile {
    pub statuses: BTreeMap<String, DlcStatus>,
    pub versions: BTreeMap<String, String>,
}

impl LegacyDlcFile {
    /// Loads the legacy DLC file, returning `None` if it does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>, GameError> {
        if !path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map(Some).map_err(|e| GameError::Malformed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Parses the two-element JSON array.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        let (statuses, versions): (BTreeMap<String, DlcStatus>, BTreeMap<String, String>) =
            serde_json::from_str(content)?;
        Ok(Self { statuses, versions })
    }

    /// Resolves the status of one DLC.
    ///
    /// An `installed` entry becomes `updatable` when a non-empty reference
    /// version is given and the recorded version differs from it.
    pub fn status(&self, dlc_title: &str, reference_version: &str) -> DlcStatus {
        let Some(&status) = self.statuses.get(dlc_title) else {
            return DlcStatus::NotInstalled;
        };

        if status == DlcStatus::Installed && !reference_version.is_empty() {
            if let Some(recorded) = self.versions.get(dlc_title) {
                if recorded != reference_version {
                    return DlcStatus::Updatable;
                }
            }
        }

        status
    }

    /// Returns the recorded version of one DLC, if any.
    pub fn version(&self, dlc_title: &str) -> Option<&str> {
        self.versions.get(dlc_title).map(String::as_str)
    }
}

/// Newline-delimited `gameinfo` file shipped with native installers.
///
/// Line 1 holds the display name, line 2 the version, line 5 the store id.
#[derive(Debug, Clone, PartialEq)]
pub struct GameInfoFile {
    pub name: String,
    pub version: Option<String>,
    pub store_id: Option<u64>,
}

impl GameInfoFile {
    /// Loads a `gameinfo` file, returning `None` if it does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>, GameError> {
        if !path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Parses the file content. Returns `None` when the name line is empty.
    pub fn parse(content: &str) -> Option<Self> {
        let lines: Vec<&str> = content.lines().map(str::trim).collect();

        let name = lines.first().filter(|l| !l.is_empty())?.to_string();
        let version = lines
            .get(1)
            .filter(|l| !l.is_empty())
            .map(|l| l.to_string());
        let store_id = lines.get(4).and_then(|l| l.parse().ok());

        Some(Self {
            name,
            version,
            store_id,
        })
    }
}
