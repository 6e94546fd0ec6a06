pub mod json_backend;
pub mod memory;

use crate::errors::Result;

/// Durable key-value storage holding serialized store snapshots.
pub trait StorageBackend: Send + Sync {
    /// Returns the value stored under `key`, or `None` when nothing was saved.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the value stored under `key`.
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

pub use json_backend::JsonStorage;
pub use memory::MemoryStorage;
