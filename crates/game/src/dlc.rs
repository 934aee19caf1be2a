//! DLC status model and source resolution.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::legacy::LegacyDlcFile;
use crate::metadata::InfoMap;

/// Install state of a single DLC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DlcStatus {
    NotInstalled,
    Installed,
    Updatable,
}

impl fmt::Display for DlcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DlcStatus::NotInstalled => write!(f, "not-installed"),
            DlcStatus::Installed => write!(f, "installed"),
            DlcStatus::Updatable => write!(f, "updatable"),
        }
    }
}

/// In-memory DLC state kept on a [`GameRecord`](crate::GameRecord).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DlcEntry {
    pub version: String,
    pub status: DlcStatus,
}

/// Where the state of one DLC is recorded.
///
/// Resolved by probing: the current metadata file wins when it has a
/// versioned entry for the DLC, then the legacy DLC file if it exists.
#[derive(Debug, Clone, PartialEq)]
pub enum DlcSource {
    /// Entry in the `"dlcs"` map of `minigalaxy-info.json`, with its version.
    Current { version: String },
    /// Legacy `minigalaxy-dlc.json` lists.
    Legacy(LegacyDlcFile),
    /// Neither layout knows about the DLC.
    Missing,
}

impl DlcSource {
    /// Probes the loaded metadata, then the legacy file at `legacy_path`.
    pub fn probe(
        info: &InfoMap,
        dlc_title: &str,
        legacy_path: Option<&Path>,
    ) -> Result<Self, GameError> {
        if let Some(version) = current_dlc_version(info, dlc_title) {
            return Ok(DlcSource::Current { version });
        }

        let Some(path) = legacy_path else {
            return Ok(DlcSource::Missing);
        };

        Ok(match LegacyDlcFile::load(path)? {
            Some(file) => DlcSource::Legacy(file),
            None => DlcSource::Missing,
        })
    }

    /// Resolves the DLC status against the store's current version.
    pub fn status(&self, dlc_title: &str, remote_version: &str) -> DlcStatus {
        match self {
            DlcSource::Current { version } if version != remote_version => DlcStatus::Updatable,
            DlcSource::Current { .. } => DlcStatus::Installed,
            DlcSource::Legacy(file) => file.status(dlc_title, remote_version),
            DlcSource::Missing => DlcStatus::NotInstalled,
        }
    }

    /// Returns the recorded version, if the source has one.
    pub fn version(&self, dlc_title: &str) -> Option<String> {
        match self {
            DlcSource::Current { version } => Some(version.clone()),
            DlcSource::Legacy(file) => file.version(dlc_title).map(str::to_string),
            DlcSource::Missing => None,
        }
    }
}

/// Returns `info["dlcs"][title]["version"]` when it is a non-empty string.
fn current_dlc_version(info: &InfoMap, dlc_title: &str) -> Option<String> {
    info.get("dlcs")?
        .get(dlc_title)?
        .get("version")?
        .as_str()
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
