#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use expense_core::{
    core::{DataStore, FixedClock, DEFAULT_STORAGE_KEY},
    domain::{CategoryKind, NewTransaction},
    errors::{Result, StoreError},
    storage::{JsonStorage, MemoryStorage, StorageBackend},
};
use once_cell::sync::Lazy;
use tempfile::TempDir;
use uuid::Uuid;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// 2024-03-01 09:00 UTC, the instant most scenarios run at.
pub fn morning_of_march_first() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Creates a unique directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Opens a JSON-backed store rooted at `base` with a fixed clock.
pub fn open_json_store(base: &Path, clock: &FixedClock) -> DataStore {
    let storage =
        JsonStorage::new(Some(base.to_path_buf())).expect("create json storage backend");
    DataStore::open(
        Box::new(storage),
        Box::new(clock.clone()),
        DEFAULT_STORAGE_KEY,
    )
}

/// Creates an isolated store backed by a unique directory.
pub fn setup_test_env() -> (DataStore, FixedClock, PathBuf) {
    let base = temp_base();
    let clock = FixedClock::new(morning_of_march_first());
    let store = open_json_store(&base, &clock);
    (store, clock, base)
}

pub fn category_named(store: &DataStore, name: &str) -> Uuid {
    store
        .categories()
        .into_iter()
        .find(|category| category.name == name)
        .map(|category| category.id)
        .unwrap_or_else(|| panic!("missing category {name}"))
}

pub fn expense_category(store: &DataStore) -> Uuid {
    store.categories_of(CategoryKind::Expense)[0].id
}

pub fn spend(amount: f64, description: &str, date: NaiveDate, category: Uuid) -> NewTransaction {
    NewTransaction::new(amount, description, date, category)
}

/// Backend whose reads find nothing and whose writes always fail.
#[derive(Debug, Default)]
pub struct FailingStorage;

impl StorageBackend for FailingStorage {
    fn read(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn write(&self, key: &str, _value: &str) -> Result<()> {
        Err(StoreError::StorageWrite {
            key: key.to_string(),
            reason: "quota exceeded".into(),
        })
    }
}

/// Backend whose reads always fail; writes land in a shared in-memory map.
#[derive(Debug, Clone, Default)]
pub struct UnreadableStorage {
    pub written: MemoryStorage,
}

impl StorageBackend for UnreadableStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Err(StoreError::StorageRead {
            key: key.to_string(),
            reason: "permission denied".into(),
        })
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.written.write(key, value)
    }
}
