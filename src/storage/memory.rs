use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use crate::errors::{Result, StoreError};

use super::StorageBackend;

/// Process-local storage. Clones share the same underlying map, so a test can
/// keep a handle and inspect what the store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `value` already stored under `key`.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let entries: HashMap<String, String> = HashMap::from([(key.into(), value.into())]);
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let guard = self.entries.read().map_err(|err| StoreError::StorageRead {
            key: key.to_string(),
            reason: err.to_string(),
        })?;
        Ok(guard.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self.entries.write().map_err(|err| StoreError::StorageWrite {
            key: key.to_string(),
            reason: err.to_string(),
        })?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
