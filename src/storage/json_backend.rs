use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    core::utils::{ensure_dir, write_atomic, PathResolver},
    errors::{Result, StoreError},
};

use super::StorageBackend;

const FILE_EXTENSION: &str = "json";

/// Stores each key as a JSON file inside a data directory.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    data_dir: PathBuf,
}

impl JsonStorage {
    /// Opens storage under `root` (or the default base directory) and creates
    /// the data directory when missing.
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let base = PathResolver::resolve_base(root);
        let data_dir = PathResolver::data_dir_in(&base);
        ensure_dir(&data_dir)?;
        Ok(Self { data_dir })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", canonical_name(key), FILE_EXTENSION))
    }
}

impl StorageBackend for JsonStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|err| StoreError::StorageRead {
                key: key.to_string(),
                reason: err.to_string(),
            })
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        write_atomic(&path, value).map_err(|err| StoreError::StorageWrite {
            key: key.to_string(),
            reason: err.to_string(),
        })
    }
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "store".into()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage_with_temp_dir() -> (JsonStorage, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let storage = JsonStorage::new(Some(temp.path().to_path_buf())).expect("json storage");
        (storage, temp)
    }

    #[test]
    fn missing_key_reads_as_none() {
        let (storage, _guard) = storage_with_temp_dir();
        assert_eq!(storage.read("expense-tracker-data").unwrap(), None);
    }

    #[test]
    fn write_then_read_returns_latest_value() {
        let (storage, _guard) = storage_with_temp_dir();
        storage.write("expense-tracker-data", "{\"a\":1}").unwrap();
        storage.write("expense-tracker-data", "{\"a\":2}").unwrap();
        assert_eq!(
            storage.read("expense-tracker-data").unwrap().as_deref(),
            Some("{\"a\":2}")
        );
        assert!(storage
            .path_for("expense-tracker-data")
            .ends_with("expense-tracker-data.json"));
    }

    #[test]
    fn keys_are_sanitized_into_file_names() {
        let (storage, _guard) = storage_with_temp_dir();
        let path = storage.path_for("../Weird Key");
        assert_eq!(path.parent(), Some(storage.data_dir()));
        assert!(path.ends_with("___weird_key.json"));
    }

    #[test]
    fn write_failure_reports_storage_write() {
        let (storage, _guard) = storage_with_temp_dir();
        // A directory at the staging path makes the write fail.
        fs::create_dir_all(crate::core::utils::tmp_path(&storage.path_for("blocked"))).unwrap();
        let err = storage.write("blocked", "{}").expect_err("write must fail");
        assert!(matches!(err, StoreError::StorageWrite { ref key, .. } if key == "blocked"));
    }
}
