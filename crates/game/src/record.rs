//! The installed-game record and its version/DLC queries.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{ConfigSource, INSTALL_DIR_KEY};
use crate::dlc::{DlcEntry, DlcSource, DlcStatus};
use crate::error::GameError;
use crate::legacy::{GameInfoFile, LegacyDlcFile};
use crate::metadata::{AcceptAll, MetadataValidator};
use crate::name::{install_directory_name, names_match, stripped_name};
use crate::{GAMEINFO_FILE_NAME, INFO_FILE_NAME, LEGACY_DLC_FILE_NAME, UNKNOWN_VERSION};

/// One game, as known from the store API or from a local install directory.
///
/// Equality follows [`names_match`] unless both sides carry a store id.
/// Because name containment is not transitive, `GameRecord` is neither `Eq`
/// nor `Hash`; compare records pairwise.
#[derive(Clone)]
pub struct GameRecord {
    pub name: String,
    pub store_id: Option<u64>,
    pub install_dir: Option<PathBuf>,
    pub status_file_path: Option<PathBuf>,
    pub installed_version: String,
    pub dlcs: BTreeMap<String, DlcEntry>,
    validator: Arc<dyn MetadataValidator>,
}

impl fmt::Debug for GameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameRecord")
            .field("name", &self.name)
            .field("store_id", &self.store_id)
            .field("install_dir", &self.install_dir)
            .field("installed_version", &self.installed_version)
            .field("dlcs", &self.dlcs)
            .finish_non_exhaustive()
    }
}

impl PartialEq for GameRecord {
    fn eq(&self, other: &Self) -> bool {
        match (self.store_id, other.store_id) {
            (Some(a), Some(b)) => a == b,
            _ => names_match(&self.name, &other.name),
        }
    }
}

impl GameRecord {
    /// Creates a record with only a display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store_id: None,
            install_dir: None,
            status_file_path: None,
            installed_version: UNKNOWN_VERSION.to_string(),
            dlcs: BTreeMap::new(),
            validator: Arc::new(AcceptAll),
        }
    }

    /// Sets the store identifier.
    pub fn with_store_id(mut self, store_id: u64) -> Self {
        self.store_id = Some(store_id);
        self
    }

    /// Sets the install directory and the metadata file path inside it.
    pub fn with_install_dir(mut self, install_dir: impl Into<PathBuf>) -> Self {
        let install_dir = install_dir.into();
        self.status_file_path = Some(install_dir.join(INFO_FILE_NAME));
        self.install_dir = Some(install_dir);
        self
    }

    /// Replaces the validator consulted before every metadata write.
    pub fn with_validator(mut self, validator: Arc<dyn MetadataValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub(crate) fn validator(&self) -> &dyn MetadataValidator {
        self.validator.as_ref()
    }

    /// Folder name this game installs into.
    pub fn get_install_directory_name(&self) -> String {
        install_directory_name(&self.name)
    }

    /// Display name without any whitespace.
    pub fn get_stripped_name(&self) -> String {
        stripped_name(&self.name)
    }

    /// Places the install directory under the configured games root.
    pub fn set_install_dir(&mut self, config: &dyn ConfigSource) -> Result<(), GameError> {
        let root = config
            .get(INSTALL_DIR_KEY)
            .ok_or_else(|| GameError::Config(INSTALL_DIR_KEY.to_string()))?;
        let install_dir = Path::new(&root).join(self.get_install_directory_name());

        self.status_file_path = Some(install_dir.join(INFO_FILE_NAME));
        self.install_dir = Some(install_dir);
        Ok(())
    }

    fn install_file(&self, file_name: &str) -> Option<PathBuf> {
        self.install_dir.as_ref().map(|dir| dir.join(file_name))
    }

    /// Reads the version from the legacy `gameinfo` file (line 2).
    ///
    /// Returns `"0"` when there is no such file or no version line.
    pub fn fallback_read_installed_version(&self) -> Result<String, GameError> {
        let Some(path) = self.install_file(GAMEINFO_FILE_NAME) else {
            return Ok(UNKNOWN_VERSION.to_string());
        };

        Ok(GameInfoFile::load(&path)?
            .and_then(|info| info.version)
            .unwrap_or_else(|| UNKNOWN_VERSION.to_string()))
    }

    /// Returns the installed version without touching the disk state.
    pub fn installed_version(&self) -> Result<String, GameError> {
        match self.get_info("version")?.filter(|v| !v.is_empty()) {
            Some(version) => Ok(version),
            None => self.fallback_read_installed_version(),
        }
    }

    /// Refreshes `installed_version` from disk.
    ///
    /// A version only found in `gameinfo` is copied into the metadata file.
    pub fn read_installed_version(&mut self) -> Result<(), GameError> {
        let recorded = self.get_info("version")?.filter(|v| !v.is_empty());
        let version = match recorded {
            Some(version) => version,
            None => {
                let fallback = self.fallback_read_installed_version()?;
                if fallback != UNKNOWN_VERSION && self.install_dir_exists() {
                    tracing::info!(game = %self.name, version = %fallback, "migrating version from gameinfo");
                    self.set_info("version", &fallback)?;
                }
                fallback
            }
        };

        self.installed_version = version;
        Ok(())
    }

    /// Reads the status of a DLC from the legacy `minigalaxy-dlc.json` file.
    pub fn legacy_get_dlc_status(
        &self,
        dlc_title: &str,
        reference_version: &str,
    ) -> Result<DlcStatus, GameError> {
        let Some(path) = self.install_file(LEGACY_DLC_FILE_NAME) else {
            return Ok(DlcStatus::NotInstalled);
        };

        Ok(match LegacyDlcFile::load(&path)? {
            Some(file) => file.status(dlc_title, reference_version),
            None => DlcStatus::NotInstalled,
        })
    }

    fn dlc_source(&self, dlc_title: &str) -> Result<DlcSource, GameError> {
        let info = self.load_minigalaxy_info_json()?;
        let legacy_path = self.install_file(LEGACY_DLC_FILE_NAME);
        DlcSource::probe(&info, dlc_title, legacy_path.as_deref())
    }

    /// Whether the store has a newer version than what is installed.
    ///
    /// Versions are opaque strings: any difference counts as an update.
    pub fn is_update_available(
        &self,
        remote_version: &str,
        dlc_title: Option<&str>,
    ) -> Result<bool, GameError> {
        let Some(dlc_title) = dlc_title else {
            return Ok(self.installed_version()? != remote_version);
        };

        Ok(match self.dlc_source(dlc_title)? {
            DlcSource::Current { version } => version != remote_version,
            DlcSource::Legacy(_) | DlcSource::Missing => {
                self.legacy_get_dlc_status(dlc_title, remote_version)? == DlcStatus::Updatable
            }
        })
    }

    fn install_dir_exists(&self) -> bool {
        self.install_dir.as_deref().is_some_and(Path::exists)
    }

    /// Whether the game (or one of its DLCs) is installed.
    pub fn is_installed(&self, dlc_title: Option<&str>) -> Result<bool, GameError> {
        let Some(dlc_title) = dlc_title else {
            return Ok(self.install_dir_exists());
        };

        Ok(match self.dlc_source(dlc_title)? {
            DlcSource::Current { .. } => true,
            DlcSource::Legacy(_) | DlcSource::Missing => {
                self.legacy_get_dlc_status(dlc_title, "")? == DlcStatus::Installed
            }
        })
    }

    /// Resolves one DLC against the store's current version.
    pub fn dlc_status(&self, dlc_title: &str, remote_version: &str) -> Result<DlcStatus, GameError> {
        Ok(self.dlc_source(dlc_title)?.status(dlc_title, remote_version))
    }

    /// Rebuilds the in-memory DLC map from `(title, store version)` pairs.
    pub fn refresh_dlcs<'a>(
        &mut self,
        remote: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<(), GameError> {
        let mut dlcs = BTreeMap::new();

        for (title, remote_version) in remote {
            let source = self.dlc_source(title)?;
            let entry = DlcEntry {
                version: source.version(title).unwrap_or_default(),
                status: source.status(title, remote_version),
            };
            dlcs.insert(title.to_string(), entry);
        }

        self.dlcs = dlcs;
        Ok(())
    }
}
