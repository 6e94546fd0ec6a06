use std::collections::HashSet;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::domain::{category::Category, transaction::Transaction};

/// Persisted bundle of every collection, tombstones included.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreEnvelope {
    #[serde(default)]
    pub expenses: Vec<Transaction>,
    #[serde(default)]
    pub incomes: Vec<Transaction>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// Envelope with records left undecoded so each can be checked on its own.
#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    expenses: Vec<Value>,
    #[serde(default)]
    incomes: Vec<Value>,
    #[serde(default)]
    categories: Vec<Value>,
}

impl StoreEnvelope {
    /// Decodes a saved envelope.
    ///
    /// Fails only when the document itself is not an envelope. Individual
    /// records that cannot be decoded are dropped with a warning and the rest
    /// are kept.
    pub fn from_json(data: &str) -> serde_json::Result<Self> {
        let raw: RawEnvelope = serde_json::from_str(data)?;
        Ok(Self {
            expenses: decode_records("expense", raw.expenses),
            incomes: decode_records("income", raw.incomes),
            categories: decode_records("category", raw.categories),
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn decode_records<T: DeserializeOwned>(label: &str, records: Vec<Value>) -> Vec<T> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warn!(index, error = %err, "skipping unreadable saved {label}");
                None
            }
        })
        .collect()
}

/// Detects transactions pointing at categories that do not exist.
pub fn dangling_references(envelope: &StoreEnvelope) -> Vec<String> {
    let category_ids: HashSet<_> = envelope.categories.iter().map(|c| c.id).collect();
    let expenses = envelope.expenses.iter().map(|txn| ("expense", txn));
    let incomes = envelope.incomes.iter().map(|txn| ("income", txn));
    expenses
        .chain(incomes)
        .filter(|(_, txn)| !category_ids.contains(&txn.category_id))
        .map(|(label, txn)| {
            format!(
                "{} {} references missing category {}",
                label, txn.id, txn.category_id
            )
        })
        .collect()
}
