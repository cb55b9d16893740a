//! Configuration for braindrop
//!
//! Chooses the storage backend and where it keeps its data. Read from
//! `config.toml` in the platform config directory unless a path is given.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::StorageError;
use crate::storage::{
    FileStorage, IdeaRepository, KeyValueStorage, MemoryStorage, DEFAULT_SLOT_KEY,
};
use crate::store::IdeaStore;

const APP_DIR: &str = "braindrop";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BraindropConfig {
    pub storage: StorageConfig,
}

/// Which medium holds the idea slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per slot in `data_dir`
    File,
    /// `braindrop.db` in `data_dir`
    Sqlite,
    /// Nothing survives the process
    Memory,
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Defaults to the platform data directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub slot_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            data_dir: None,
            slot_key: DEFAULT_SLOT_KEY.to_string(),
        }
    }
}

impl BraindropConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config dir>/braindrop/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(format!("{}: {}", path.display(), e))),
        };
        let config = Self::from_toml(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let key = self.storage.slot_key.trim();
        if key.is_empty() {
            return Err(ConfigError::Invalid("storage.slot_key must not be empty".into()));
        }
        if key.contains(|c: char| c == '/' || c == '\\') || key.starts_with('.') {
            return Err(ConfigError::Invalid(format!(
                "storage.slot_key {:?} must be a plain name",
                key
            )));
        }
        Ok(())
    }

    /// Resolved data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join(APP_DIR)))
            .unwrap_or_else(|| PathBuf::from(".braindrop"))
    }

    /// Build the configured backend.
    pub fn open_backend(&self) -> Result<Box<dyn KeyValueStorage>, ConfigError> {
        self.validate()?;
        let backend: Box<dyn KeyValueStorage> = match self.storage.backend {
            StorageBackend::File => Box::new(FileStorage::new(self.data_dir())),
            StorageBackend::Memory => Box::new(MemoryStorage::new()),
            #[cfg(feature = "sqlite")]
            StorageBackend::Sqlite => {
                let dir = self.data_dir();
                std::fs::create_dir_all(&dir)
                    .map_err(|e| ConfigError::Io(format!("{}: {}", dir.display(), e)))?;
                Box::new(crate::storage::SqliteStorage::open(&dir.join("braindrop.db"))?)
            }
            #[cfg(not(feature = "sqlite"))]
            StorageBackend::Sqlite => {
                return Err(ConfigError::Invalid(
                    "sqlite backend requires the `sqlite` feature".into(),
                ))
            }
        };
        tracing::debug!(backend = ?self.storage.backend, dir = %self.data_dir().display(), "opened storage");
        Ok(backend)
    }

    /// An idea store over the configured backend. Not yet initialized.
    pub fn open_store(&self) -> Result<IdeaStore, ConfigError> {
        let backend = self.open_backend()?;
        Ok(IdeaStore::new(IdeaRepository::with_key(
            backend,
            self.storage.slot_key.trim(),
        )))
    }
}

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error: {0}")]
    Io(String),

    #[error("Config parse error: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
