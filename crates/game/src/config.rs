//! Read-only configuration lookup used to place install directories.

use std::collections::HashMap;

/// Key holding the root directory games are installed under.
pub const INSTALL_DIR_KEY: &str = "install_dir";

/// Read-only key lookup into the client configuration.
///
/// The driver implements this on top of its config file; tests pass a map.
pub trait ConfigSource {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}
