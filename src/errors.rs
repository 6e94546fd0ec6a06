use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Record collections managed by the data store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Expense,
    Income,
    Category,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecordKind::Expense => "Expense",
            RecordKind::Income => "Income",
            RecordKind::Category => "Category",
        };
        f.write_str(label)
    }
}

/// Error type that captures store, storage, and input failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read `{key}` from storage: {reason}")]
    StorageRead { key: String, reason: String },
    #[error("Failed to write `{key}` to storage: {reason}")]
    StorageWrite { key: String, reason: String },
    #[error("Serialization error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{kind} not found: {id}")]
    NotFound { kind: RecordKind, id: Uuid },
    #[error("Default categories cannot be deleted: `{0}`")]
    DefaultCategory(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    pub(crate) fn not_found(kind: RecordKind, id: Uuid) -> Self {
        StoreError::NotFound { kind, id }
    }
}
