use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Name of the configuration file inside a repository.
pub const CONFIG_FILE: &str = "arbor.toml";

/// Configuration for an on-disk object store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Repository root. Objects live under `<root>/objects`.
    pub root: PathBuf,
    /// zstd compression level for loose objects.
    pub compression_level: i32,
    /// `fsync` each object file before it is made visible.
    pub fsync: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            compression_level: 3,
            fsync: false,
        }
    }
}

impl StoreConfig {
    /// Default configuration rooted at `root`.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Load a configuration file. A missing file yields the defaults.
    pub fn load(path: &Path) -> StoreResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> StoreResult<Self> {
        toml::from_str(text).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Render this configuration as TOML.
    pub fn to_toml(&self) -> StoreResult<String> {
        toml::to_string_pretty(self).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Write this configuration to `path`.
    pub fn save(&self, path: &Path) -> StoreResult<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Directory holding the sharded object files.
    pub fn objects_dir(&self) -> PathBuf {
        self.root.join("objects")
    }
}
