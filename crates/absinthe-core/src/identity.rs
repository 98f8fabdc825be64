//! Persistent identity store.
//!
//! A small string key/value store that survives restarts, holding the id of
//! the anonymous account the console operates as. Storage failures never
//! surface to callers: a failed read is reported as an absent value and a
//! failed write is dropped, both with a warning in the log.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Keys recognized by the identity store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    UserId,
}

impl StorageKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserId => "userId",
        }
    }
}

/// String key/value persistence.
pub trait IdentityStore: Send + Sync {
    /// Read a value. Storage failures read as `None`.
    fn get(&self, key: StorageKey) -> Option<String>;

    /// Write a value. Storage failures are logged and ignored.
    fn set(&self, key: StorageKey, value: &str);
}

/// Identity store backed by a JSON object file.
#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `~/.absinthe/storage.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".absinthe").join("storage.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whole file as a JSON object. Entries this store does not own are kept as-is.
    fn read_all(&self) -> Result<Map<String, Value>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, values: &Map<String, Value>) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, json).map_err(|e| {
            Error::Storage(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

impl IdentityStore for FileIdentityStore {
    fn get(&self, key: StorageKey) -> Option<String> {
        match self.read_all() {
            Ok(mut values) => match values.remove(key.as_str()) {
                Some(Value::String(value)) => Some(value),
                Some(_) => {
                    warn!(key = key.as_str(), "Identity store value is not a string");
                    None
                }
                None => None,
            },
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read identity store");
                None
            }
        }
    }

    fn set(&self, key: StorageKey, value: &str) {
        // A corrupt file is replaced rather than blocking every later write.
        let mut values = self.read_all().unwrap_or_default();
        values.insert(key.as_str().to_string(), Value::String(value.to_string()));
        match self.write_all(&values) {
            Ok(()) => debug!(key = key.as_str(), "Identity store updated"),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to write identity store");
            }
        }
    }
}

/// In-memory identity store, used when no storage path is available and in tests.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    values: Mutex<HashMap<StorageKey, String>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn get(&self, key: StorageKey) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    fn set(&self, key: StorageKey, value: &str) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value.to_string());
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileIdentityStore::new(dir.path().join("storage.json"));
        assert!(store.get(StorageKey::UserId).is_none());
    }

    #[test]
    fn set_then_get_roundtrips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");
        FileIdentityStore::new(&path).set(StorageKey::UserId, "u-123");

        let reopened = FileIdentityStore::new(&path);
        assert_eq!(reopened.get(StorageKey::UserId).as_deref(), Some("u-123"));
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"userId\""), "got: {raw}");
    }

    #[test]
    fn corrupt_file_reads_as_absent_and_is_replaced_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{garbage").unwrap();
        let store = FileIdentityStore::new(&path);

        assert!(store.get(StorageKey::UserId).is_none());
        store.set(StorageKey::UserId, "u-1");
        assert_eq!(store.get(StorageKey::UserId).as_deref(), Some("u-1"));
    }

    #[test]
    fn foreign_entries_survive_and_do_not_hide_the_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"{"userId":"u-1","theme":{"dark":true},"visits":3}"#).unwrap();
        let store = FileIdentityStore::new(&path);

        assert_eq!(store.get(StorageKey::UserId).as_deref(), Some("u-1"));
        store.set(StorageKey::UserId, "u-2");

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["userId"], "u-2");
        assert_eq!(raw["theme"]["dark"], true);
        assert_eq!(raw["visits"], 3);
    }

    #[test]
    fn non_string_id_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"{"userId":42}"#).unwrap();
        assert!(FileIdentityStore::new(&path).get(StorageKey::UserId).is_none());
    }

    #[test]
    fn unwritable_path_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        // The store path is a directory, so the write must fail.
        let store = FileIdentityStore::new(dir.path());
        store.set(StorageKey::UserId, "u-1");
        assert!(store.get(StorageKey::UserId).is_none());
    }

    #[test]
    fn memory_store_overwrites() {
        let store = MemoryIdentityStore::new();
        store.set(StorageKey::UserId, "a");
        store.set(StorageKey::UserId, "b");
        assert_eq!(store.get(StorageKey::UserId).as_deref(), Some("b"));
    }

    #[test]
    fn storage_key_name_matches_persisted_field() {
        assert_eq!(StorageKey::UserId.as_str(), "userId");
    }
}
