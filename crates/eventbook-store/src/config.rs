// ABOUTME: Configuration loading for eventbook: data directory, storage backend and seeding.
// ABOUTME: Reads EVENTBOOK_* environment variables and opens the matching key-value store.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::file::FileStore;
use crate::kv::{KeyValueStore, StoreError};
use crate::sqlite::SqliteStore;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("EVENTBOOK_BACKEND must be 'json' or 'sqlite', got '{0}'")]
    InvalidBackend(String),
}

/// Which key-value store holds the collections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backend {
    /// One JSON file per collection under `<home>/data`.
    #[default]
    Json,
    /// A SQLite database at `<home>/eventbook.db`.
    Sqlite,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "file" => Ok(Self::Json),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(ConfigError::InvalidBackend(s.to_string())),
        }
    }
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventbookConfig {
    pub home: PathBuf,
    pub backend: Backend,
    pub seed: bool,
}

impl EventbookConfig {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Environment variables:
    /// - EVENTBOOK_HOME: data directory (default: ~/.eventbook)
    /// - EVENTBOOK_BACKEND: `json` or `sqlite` (default: json)
    /// - EVENTBOOK_SEED: seed demo events into an empty catalog (default: true)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let home = lookup("EVENTBOOK_HOME")
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                lookup("HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
                    .join(".eventbook")
            });

        let backend = match lookup("EVENTBOOK_BACKEND").filter(|b| !b.is_empty()) {
            Some(name) => name.parse()?,
            None => Backend::default(),
        };

        let seed = lookup("EVENTBOOK_SEED")
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(true);

        Ok(Self {
            home,
            backend,
            seed,
        })
    }

    /// Open the configured store, creating directories as needed.
    pub fn open_store(&self) -> Result<Box<dyn KeyValueStore>, StoreError> {
        tracing::debug!(home = %self.home.display(), backend = ?self.backend, "opening store");
        match self.backend {
            Backend::Json => Ok(Box::new(FileStore::open(&self.home.join("data"))?)),
            Backend::Sqlite => Ok(Box::new(SqliteStore::open(&self.home.join("eventbook.db"))?)),
        }
    }
}
