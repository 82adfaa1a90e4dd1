use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{KeyedStore, StoreKey};
use crate::error::StoreError;

/// Durable state store backed by the filesystem.
///
/// One JSON document per key under the base directory. Holds nothing secret:
/// mnemonics and the passcode go through [`super::SecretStore`] only.
pub struct FileStore {
    base_path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Open a store rooted at the given directory
    pub fn open(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Base directory of this store
    pub fn base_dir(&self) -> &Path {
        &self.base_path
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", key))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, StoreError> {
        self.lock
            .lock()
            .map_err(|_| StoreError::BackendUnavailable("store lock poisoned".to_string()))
    }
}

impl<K: StoreKey, V: Serialize + DeserializeOwned> KeyedStore<K, V> for FileStore {
    fn load(&self, key: &K) -> Result<V, StoreError> {
        let _guard = self.lock()?;
        let path = self.record_path(&key.storage_key());
        if !path.exists() {
            return Err(StoreError::NotFound(key.storage_key()));
        }
        let contents = fs::read_to_string(&path)
            .map_err(|e| StoreError::BackendUnavailable(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| StoreError::CorruptData(e.to_string()))
    }

    fn save(&self, value: &V, key: &K) -> Result<(), StoreError> {
        let _guard = self.lock()?;
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;
        fs::create_dir_all(&self.base_path)
            .map_err(|e| StoreError::BackendUnavailable(e.to_string()))?;
        fs::write(self.record_path(&key.storage_key()), json)
            .map_err(|e| StoreError::BackendUnavailable(e.to_string()))
    }

    fn delete(&self, key: &K) -> Result<(), StoreError> {
        let _guard = self.lock()?;
        let path = self.record_path(&key.storage_key());
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            // Deleting an absent key is a no-op success
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::BackendUnavailable(e.to_string())),
        }
    }
}
