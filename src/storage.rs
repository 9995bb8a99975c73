//! Key/Value Storage
//!
//! Local persistence behind the leaderboards. One string value per key,
//! mirroring browser local storage. Backends report failures as
//! [`StorageError`]; callers above this layer decide whether to swallow them.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

/// Storage failures.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying filesystem error.
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),

    /// Write would exceed the backend's quota.
    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded {
        /// Bytes the store would hold after the write
        needed: usize,
        /// Configured limit
        quota: usize,
    },

    /// Storage is switched off or not present.
    #[error("storage unavailable")]
    Unavailable,

    /// Key contains characters the backend cannot store.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// String key/value store.
pub trait Storage {
    /// Read a value. Missing keys are `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key succeeds.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// MEMORY STORAGE
// =============================================================================

/// In-process storage, optionally with a byte quota.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
    quota: Option<usize>,
    unavailable: bool,
}

impl MemoryStorage {
    /// Unlimited in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that refuses writes once keys plus values exceed `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    /// Storage where every operation fails, like a disabled browser store.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Bytes currently held.
    pub fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable {
            Err(StorageError::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_available()?;
        if let Some(quota) = self.quota {
            let replaced = self.entries.get(key).map_or(0, |old| key.len() + old.len());
            let needed = self.used_bytes() - replaced + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.check_available()?;
        self.entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// FILE STORAGE
// =============================================================================

/// One `<key>.json` file per key inside a directory.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        // Write-then-rename so a crash never leaves a half-written list
        let tmp = self.dir.join(format!(".{}.{}.tmp", key, uuid::Uuid::new_v4()));
        fs::write(&tmp, value)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        debug!("Stored {} bytes under {}", value.len(), key);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("arcade-storage-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_memory_roundtrip() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get("k").unwrap(), None);

        storage.set("k", "v1").unwrap();
        storage.set("k", "v2").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v2"));

        storage.remove("k").unwrap();
        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
    }

    #[test]
    fn test_memory_quota() {
        let mut storage = MemoryStorage::with_quota(10);
        storage.set("key", "1234567").unwrap();

        // Replacing counts only the new value
        storage.set("key", "abcdefg").unwrap();

        let err = storage.set("key", "12345678").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { needed: 11, quota: 10 }));
        assert_eq!(storage.get("key").unwrap().as_deref(), Some("abcdefg"));
    }

    #[test]
    fn test_memory_unavailable() {
        let mut storage = MemoryStorage::unavailable();
        assert!(matches!(storage.get("k"), Err(StorageError::Unavailable)));
        assert!(matches!(storage.set("k", "v"), Err(StorageError::Unavailable)));
        assert!(matches!(storage.remove("k"), Err(StorageError::Unavailable)));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = scratch_dir();
        let mut storage = FileStorage::open(&dir).unwrap();

        assert_eq!(storage.get("shooter_leaderboard_v1").unwrap(), None);
        storage.set("shooter_leaderboard_v1", "[]").unwrap();
        assert_eq!(storage.get("shooter_leaderboard_v1").unwrap().as_deref(), Some("[]"));
        assert!(dir.join("shooter_leaderboard_v1.json").exists());

        // Reopening sees the same data
        let reopened = FileStorage::open(&dir).unwrap();
        assert_eq!(reopened.get("shooter_leaderboard_v1").unwrap().as_deref(), Some("[]"));

        storage.remove("shooter_leaderboard_v1").unwrap();
        storage.remove("shooter_leaderboard_v1").unwrap();
        assert_eq!(storage.get("shooter_leaderboard_v1").unwrap(), None);

        // No temp files left behind
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_rejects_path_keys() {
        let dir = scratch_dir();
        let mut storage = FileStorage::open(&dir).unwrap();

        assert!(matches!(storage.set("../escape", "x"), Err(StorageError::InvalidKey(_))));
        assert!(matches!(storage.get(""), Err(StorageError::InvalidKey(_))));
        fs::remove_dir_all(&dir).unwrap();
    }
}
