//! Durable key-value storage
//!
//! The stores never touch the filesystem directly. They talk to a
//! [`KeyValueStore`], which holds raw strings under short keys. JSON
//! encoding lives in [`load_json`] and [`save_json`].

use crate::config::app::NAME;
use crate::config::storage::FILE_EXTENSION;
use crate::error::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// String storage addressed by key
///
/// Implementations: in-memory map, one-file-per-key directory.
pub trait KeyValueStore {
    /// Read the value stored under `key`, `None` if the key is not set
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

// =============================================================================
// JSON helpers
// =============================================================================

/// Load a JSON value stored under `key`
///
/// Fails open: an unset key, an empty value, a storage read failure or
/// malformed JSON all yield `None`. The last two are logged.
pub fn load_json<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Option<T> {
    let content = match store.get(key) {
        Ok(Some(c)) => c,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "failed to read stored data, starting empty");
            return None;
        }
    };

    if content.trim().is_empty() {
        return None;
    }

    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "discarding malformed stored data");
            None
        }
    }
}

/// Serialize `value` as JSON and store it under `key`
pub fn save_json<T: Serialize + ?Sized>(
    store: &impl KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let content = serde_json::to_string(value)?;
    store.set(key, &content)?;
    debug!(key, bytes = content.len(), "persisted");
    Ok(())
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// In-memory storage
///
/// Nothing survives the process. Used as the test double for durable
/// storage and for ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-seeded with a raw value
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::new();
        storage.lock().insert(key.into(), value.into());
        storage
    }

    /// Raw value under `key`, bypassing the `Result` of the trait
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Number of keys stored
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no keys are stored
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}

// =============================================================================
// FileStorage
// =============================================================================

/// Get the default data directory path
pub fn data_dir() -> Result<PathBuf> {
    dirs::data_dir().map(|p| p.join(NAME)).ok_or_else(|| {
        Error::Config(
            "Could not determine data directory. HOME environment variable may not be set."
                .to_string(),
        )
    })
}

/// Directory-backed storage, one `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage in the default data directory
    pub fn new() -> Result<Self> {
        Ok(Self { dir: data_dir()? })
    }

    /// Storage in a custom directory (for testing or portable installs)
    ///
    /// The directory is created lazily on first write.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory holding the files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.{FILE_EXTENSION}")))
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        read_file(&self.path_for(key)?)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        create_dir_if_needed(&self.dir)?;
        write_file(&path, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        delete_file(&self.path_for(key)?)
    }
}

/// Keys become file names, so path separators and dot segments are refused
fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::Storage(format!("Invalid storage key {key:?}")))
    }
}

/// Create a directory if it doesn't exist, with proper error handling
fn create_dir_if_needed(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| {
        let msg = match e.kind() {
            ErrorKind::PermissionDenied => {
                format!("Permission denied: cannot create directory {:?}", path)
            }
            _ => format!("Failed to create directory {:?}: {}", path, e),
        };
        Error::Storage(msg)
    })
}

fn read_file(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) => match e.kind() {
            ErrorKind::NotFound => Ok(None),
            ErrorKind::PermissionDenied => Err(Error::Storage(format!(
                "Permission denied: cannot read {:?}",
                path
            ))),
            _ => Err(Error::Storage(format!("Failed to read {:?}: {}", path, e))),
        },
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| {
        let msg = match e.kind() {
            ErrorKind::PermissionDenied => {
                format!("Permission denied: cannot write to {:?}", path)
            }
            ErrorKind::ReadOnlyFilesystem => {
                format!("Cannot write to {:?}: filesystem is read-only", path)
            }
            _ => format!("Failed to write to {:?}: {}", path, e),
        };
        Error::Storage(msg)
    })
}

fn delete_file(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Storage(format!("Failed to delete {:?}: {}", path, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::env::temp_dir;
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

    fn temp_storage(name: &str) -> FileStorage {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        FileStorage::with_dir(temp_dir().join(format!(
            "apotheca_test_{}_{}_{}",
            std::process::id(),
            id,
            name
        )))
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestData {
        name: String,
        value: i32,
    }

    #[test]
    fn test_memory_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k").unwrap(), None);

        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap(), Some("v".to_string()));

        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
        storage.remove("k").unwrap();
    }

    #[test]
    fn test_json_roundtrip_memory() {
        let storage = MemoryStorage::new();
        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };

        save_json(&storage, "data", &data).unwrap();
        let loaded: Option<TestData> = load_json(&storage, "data");
        assert_eq!(loaded, Some(data));
    }

    #[test]
    fn test_load_json_missing_key() {
        let storage = MemoryStorage::new();
        let loaded: Option<TestData> = load_json(&storage, "missing");
        assert_eq!(loaded, None);
    }

    #[test]
    fn test_load_json_empty_value() {
        let storage = MemoryStorage::with_entry("data", "   ");
        let loaded: Option<TestData> = load_json(&storage, "data");
        assert_eq!(loaded, None);
    }

    #[test]
    fn test_load_json_malformed_fails_open() {
        let storage = MemoryStorage::with_entry("data", "not-json");
        let loaded: Option<Vec<String>> = load_json(&storage, "data");
        assert_eq!(loaded, None);
    }

    #[test]
    fn test_load_json_wrong_shape_fails_open() {
        let storage = MemoryStorage::with_entry("data", r#"{"a": 1}"#);
        let loaded: Option<Vec<String>> = load_json(&storage, "data");
        assert_eq!(loaded, None);
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let storage = temp_storage("roundtrip");

        storage.set("wishlist", r#"["a"]"#).unwrap();
        assert!(storage.path_for("wishlist").unwrap().exists());
        assert_eq!(storage.get("wishlist").unwrap(), Some(r#"["a"]"#.to_string()));

        let _ = fs::remove_dir_all(storage.dir());
    }

    #[test]
    fn test_file_storage_missing_file() {
        let storage = temp_storage("missing");
        assert_eq!(storage.get("wishlist").unwrap(), None);
    }

    #[test]
    fn test_file_storage_creates_dir_on_write() {
        let storage = temp_storage("nested");
        assert!(!storage.dir().exists());

        save_json(&storage, "comparison", &vec![1, 2, 3]).unwrap();
        assert!(storage.dir().exists());

        let _ = fs::remove_dir_all(storage.dir());
    }

    #[test]
    fn test_file_storage_remove() {
        let storage = temp_storage("remove");
        storage.set("k", "v").unwrap();
        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);

        // Already gone
        storage.remove("k").unwrap();

        let _ = fs::remove_dir_all(storage.dir());
    }

    #[test]
    fn test_file_storage_rejects_path_keys() {
        let storage = temp_storage("keys");
        assert!(storage.set("../escape", "x").is_err());
        assert!(storage.get("a/b").is_err());
        assert!(storage.get("").is_err());
    }

    #[test]
    fn test_load_json_file_malformed() {
        let storage = temp_storage("malformed");
        storage.set("wishlist", "not-json").unwrap();

        let loaded: Option<Vec<String>> = load_json(&storage, "wishlist");
        assert_eq!(loaded, None);

        let _ = fs::remove_dir_all(storage.dir());
    }

    #[test]
    fn test_reference_store() {
        let storage = MemoryStorage::new();
        let by_ref = &storage;
        by_ref.set("k", "v").unwrap();
        assert_eq!(storage.raw("k"), Some("v".to_string()));
    }
}
