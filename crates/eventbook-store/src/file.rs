// ABOUTME: Directory-backed key-value store: one <key>.json file per key.
// ABOUTME: Writes go to a .tmp file, are fsynced, then atomically renamed over the old value.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::kv::{KeyValueStore, StoreError};

/// A key-value store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store at `dir`, creating the directory if needed.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid store key: {:?}", key),
            )));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let final_path = self.path_for(key)?;
        let tmp_path = self.dir.join(format!("{}.tmp", key));

        let mut file = File::create(&tmp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &final_path)?;

        // Best-effort: make the rename itself durable.
        if let Ok(dir) = File::open(&self.dir) {
            let _ = dir.sync_all();
        }

        tracing::debug!(key, bytes = value.len(), "file store write");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn set_then_get_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();

        store.set("events", r#"[{"id":"a"}]"#).unwrap();

        assert_eq!(
            store.get("events").unwrap().as_deref(),
            Some(r#"[{"id":"a"}]"#)
        );
        assert!(dir.path().join("events.json").exists());
        assert!(!dir.path().join("events.tmp").exists());
    }

    #[test]
    fn missing_key_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(store.get("bookings").unwrap().is_none());
    }

    #[test]
    fn overwrite_replaces_value() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();

        store.set("bookings", "[1]").unwrap();
        store.set("bookings", "[]").unwrap();

        assert_eq!(store.get("bookings").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn open_creates_nested_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("deep").join("data");

        let mut store = FileStore::open(&nested).unwrap();
        store.set("events", "[]").unwrap();

        assert!(nested.join("events.json").exists());
    }

    #[test]
    fn rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();

        assert!(store.set("../escape", "x").is_err());
        assert!(store.get("").is_err());
    }
}
