//! Installed game records: identity matching, metadata sidecar, DLC status.
//!
//! A [`GameRecord`] describes one game either as reported by the store API
//! (display name + store id) or as found on disk (display name + install
//! directory). Records from both sources compare equal when they refer to
//! the same game, see [`names_match`].
//!
//! Per-install state lives in a JSON sidecar (`minigalaxy-info.json`) inside
//! the install directory. Two older on-disk layouts are still read:
//!
//! - `minigalaxy-dlc.json`: DLC status/version lists
//! - `gameinfo`: newline-delimited fields, version on line 2

mod config;
mod dlc;
mod error;
mod legacy;
mod metadata;
mod name;
mod record;
mod scan;

pub use config::{ConfigSource, INSTALL_DIR_KEY};
pub use dlc::{DlcEntry, DlcSource, DlcStatus};
pub use error::GameError;
pub use legacy::{GameInfoFile, LegacyDlcFile};
pub use metadata::{AcceptAll, InfoMap, KeyAllowList, MetadataValidator};
pub use name::{install_directory_name, names_match, normalize, stripped_name};
pub use record::GameRecord;
pub use scan::{is_goggame_info, scan_installed_games};

/// File name of the per-install JSON metadata sidecar.
pub const INFO_FILE_NAME: &str = "minigalaxy-info.json";

/// File name of the legacy DLC status file.
pub const LEGACY_DLC_FILE_NAME: &str = "minigalaxy-dlc.json";

/// File name of the legacy newline-delimited game info file.
pub const GAMEINFO_FILE_NAME: &str = "gameinfo";

/// Version string reported when nothing is installed or the version is unknown.
pub const UNKNOWN_VERSION: &str = "0";
