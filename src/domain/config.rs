use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::Os;

/// Configuration for the checklist manager.
///
/// Controls where the checklist document is stored and which (product, OS)
/// bucket is selected when the caller does not specify one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the checklist storage file.
    pub file: PathBuf,

    /// Product selected when none is given.
    pub default_product: String,

    /// Operating system selected when none is given.
    pub default_os: Os,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: PathBuf::from("checklist.json"),
            default_product: "CI".to_string(),
            default_os: Os::Windows,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or
    /// if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }
}
