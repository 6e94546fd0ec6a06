//! Canonical, persisted collections of expenses, incomes, and categories.

use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::core::time::Clock;
use crate::domain::{
    common::{visible, Displayable, Identifiable, SoftDeletable},
    defaults::default_categories,
    envelope::{dangling_references, StoreEnvelope},
    Category, CategoryKind, CategoryPatch, Expense, Income, NewCategory, NewTransaction,
    Transaction, TransactionKind, TransactionPatch,
};
use crate::errors::{RecordKind, Result, StoreError};
use crate::storage::StorageBackend;

/// Storage key the snapshot lives under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "expense-tracker-data";

/// Single source of truth for categories and transactions.
///
/// Every mutation after the initial load writes the whole envelope back to
/// storage. Write failures are logged and the in-memory change is kept.
pub struct DataStore {
    expenses: Vec<Expense>,
    incomes: Vec<Income>,
    categories: Vec<Category>,
    loading: bool,
    key: String,
    storage: Box<dyn StorageBackend>,
    clock: Box<dyn Clock>,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    expenses: &'a [Expense],
    incomes: &'a [Income],
    categories: &'a [Category],
}

impl DataStore {
    /// Creates an empty store that has not loaded yet.
    pub fn new(
        storage: Box<dyn StorageBackend>,
        clock: Box<dyn Clock>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            expenses: Vec::new(),
            incomes: Vec::new(),
            categories: Vec::new(),
            loading: true,
            key: key.into(),
            storage,
            clock,
        }
    }

    /// Creates a store and hydrates it from storage.
    pub fn open(
        storage: Box<dyn StorageBackend>,
        clock: Box<dyn Clock>,
        key: impl Into<String>,
    ) -> Self {
        let mut store = Self::new(storage, clock, key);
        store.load();
        store
    }

    /// Hydrates the collections from the saved envelope.
    ///
    /// Never fails: missing or unreadable data leaves an empty store with
    /// freshly seeded default categories.
    pub fn load(&mut self) {
        self.loading = true;
        match self.read_envelope() {
            Ok(Some(envelope)) => {
                info!(
                    key = %self.key,
                    expenses = envelope.expenses.len(),
                    incomes = envelope.incomes.len(),
                    categories = envelope.categories.len(),
                    "loaded saved data"
                );
                self.expenses = envelope.expenses;
                self.incomes = envelope.incomes;
                if envelope.categories.is_empty() {
                    self.seed_default_categories();
                } else {
                    self.categories = envelope.categories;
                }
            }
            Ok(None) => {
                info!(key = %self.key, "no saved data found, starting fresh");
                self.reset_collections();
                self.seed_default_categories();
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to load saved data, starting fresh");
                self.reset_collections();
                self.seed_default_categories();
            }
        }
        for warning in dangling_references(&self.envelope()) {
            warn!("{warning}");
        }
        self.loading = false;
    }

    /// True only while the initial load is in progress.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    // Read surface.

    pub fn expenses(&self) -> Vec<&Expense> {
        visible(&self.expenses)
    }

    pub fn incomes(&self) -> Vec<&Income> {
        visible(&self.incomes)
    }

    pub fn categories(&self) -> Vec<&Category> {
        visible(&self.categories)
    }

    /// Visible categories of one type.
    pub fn categories_of(&self, kind: CategoryKind) -> Vec<&Category> {
        self.categories()
            .into_iter()
            .filter(|category| category.kind == kind)
            .collect()
    }

    pub fn transactions(&self, kind: TransactionKind) -> Vec<&Transaction> {
        match kind {
            TransactionKind::Expense => self.expenses(),
            TransactionKind::Income => self.incomes(),
        }
    }

    /// Every expense, tombstones included.
    pub fn all_expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn all_incomes(&self) -> &[Income] {
        &self.incomes
    }

    pub fn all_categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn expense(&self, id: Uuid) -> Option<&Expense> {
        find_record(&self.expenses, id)
    }

    pub fn income(&self, id: Uuid) -> Option<&Income> {
        find_record(&self.incomes, id)
    }

    pub fn category(&self, id: Uuid) -> Option<&Category> {
        find_record(&self.categories, id)
    }

    /// Snapshot of everything that would be persisted.
    pub fn envelope(&self) -> StoreEnvelope {
        StoreEnvelope {
            expenses: self.expenses.clone(),
            incomes: self.incomes.clone(),
            categories: self.categories.clone(),
        }
    }

    // Mutations.

    pub fn add_expense(&mut self, fields: NewTransaction) -> Uuid {
        self.add_transaction(TransactionKind::Expense, fields)
    }

    pub fn add_income(&mut self, fields: NewTransaction) -> Uuid {
        self.add_transaction(TransactionKind::Income, fields)
    }

    pub fn update_expense(&mut self, id: Uuid, patch: TransactionPatch) -> Result<()> {
        self.update_transaction(TransactionKind::Expense, id, patch)
    }

    pub fn update_income(&mut self, id: Uuid, patch: TransactionPatch) -> Result<()> {
        self.update_transaction(TransactionKind::Income, id, patch)
    }

    pub fn delete_expense(&mut self, id: Uuid) -> Result<()> {
        self.delete_transaction(TransactionKind::Expense, id)
    }

    pub fn delete_income(&mut self, id: Uuid) -> Result<()> {
        self.delete_transaction(TransactionKind::Income, id)
    }

    pub fn add_category(&mut self, fields: NewCategory) -> Uuid {
        let id = fresh_id(self.categories.iter().map(|c| c.id));
        let now = self.clock.now();
        debug!(%id, name = %fields.name, "adding category");
        self.categories.push(Category::create(id, fields, now));
        self.persist();
        id
    }

    pub fn update_category(&mut self, id: Uuid, patch: CategoryPatch) -> Result<()> {
        let now = self.clock.now();
        let category = find_record_mut(&mut self.categories, id)
            .ok_or_else(|| StoreError::not_found(RecordKind::Category, id))?;
        category.apply(patch, now);
        debug!(%id, "updated category");
        self.persist();
        Ok(())
    }

    /// Soft-deletes a category. Default categories are refused and left
    /// untouched.
    pub fn delete_category(&mut self, id: Uuid) -> Result<()> {
        let now = self.clock.now();
        let category = find_record_mut(&mut self.categories, id)
            .ok_or_else(|| StoreError::not_found(RecordKind::Category, id))?;
        if category.is_default {
            warn!(%id, name = %category.name, "refusing to delete default category");
            return Err(StoreError::DefaultCategory(category.name.clone()));
        }
        category.mark_deleted(now);
        debug!(%id, label = %category.display_label(), "deleted category");
        self.persist();
        Ok(())
    }

    fn add_transaction(&mut self, kind: TransactionKind, fields: NewTransaction) -> Uuid {
        let now = self.clock.now();
        let collection = self.collection_mut(kind);
        let id = fresh_id(collection.iter().map(|txn| txn.id));
        collection.push(Transaction::create(id, fields, now));
        debug!(%id, %kind, "added transaction");
        self.persist();
        id
    }

    fn update_transaction(
        &mut self,
        kind: TransactionKind,
        id: Uuid,
        patch: TransactionPatch,
    ) -> Result<()> {
        let now = self.clock.now();
        let record = find_record_mut(self.collection_mut(kind), id)
            .ok_or_else(|| StoreError::not_found(record_kind(kind), id))?;
        record.apply(patch, now);
        debug!(%id, %kind, "updated transaction");
        self.persist();
        Ok(())
    }

    fn delete_transaction(&mut self, kind: TransactionKind, id: Uuid) -> Result<()> {
        let now = self.clock.now();
        let record = find_record_mut(self.collection_mut(kind), id)
            .ok_or_else(|| StoreError::not_found(record_kind(kind), id))?;
        record.mark_deleted(now);
        debug!(%id, %kind, label = %record.display_label(), "deleted transaction");
        self.persist();
        Ok(())
    }

    fn collection_mut(&mut self, kind: TransactionKind) -> &mut Vec<Transaction> {
        match kind {
            TransactionKind::Expense => &mut self.expenses,
            TransactionKind::Income => &mut self.incomes,
        }
    }

    fn reset_collections(&mut self) {
        self.expenses.clear();
        self.incomes.clear();
        self.categories.clear();
    }

    fn seed_default_categories(&mut self) {
        let now = self.clock.now();
        let mut seeded: Vec<Category> = Vec::new();
        for fields in default_categories() {
            let id = fresh_id(seeded.iter().map(|c| c.id));
            seeded.push(Category::create(id, fields, now));
        }
        info!(count = seeded.len(), "seeded default categories");
        self.categories = seeded;
        self.write_snapshot();
    }

    fn read_envelope(&self) -> Result<Option<StoreEnvelope>> {
        match self.storage.read(&self.key)? {
            Some(data) => Ok(Some(StoreEnvelope::from_json(&data)?)),
            None => Ok(None),
        }
    }

    fn persist(&self) {
        if self.loading {
            return;
        }
        self.write_snapshot();
    }

    fn write_snapshot(&self) {
        let snapshot = EnvelopeRef {
            expenses: &self.expenses,
            incomes: &self.incomes,
            categories: &self.categories,
        };
        let result = serde_json::to_string(&snapshot)
            .map_err(StoreError::from)
            .and_then(|json| self.storage.write(&self.key, &json));
        if let Err(err) = result {
            error!(key = %self.key, error = %err, "failed to save data");
        }
    }
}

fn record_kind(kind: TransactionKind) -> RecordKind {
    match kind {
        TransactionKind::Expense => RecordKind::Expense,
        TransactionKind::Income => RecordKind::Income,
    }
}

fn find_record<T: Identifiable>(records: &[T], id: Uuid) -> Option<&T> {
    records.iter().find(|record| record.id() == id)
}

fn find_record_mut<T: Identifiable>(records: &mut [T], id: Uuid) -> Option<&mut T> {
    records.iter_mut().find(|record| record.id() == id)
}

/// Generates an id not present among `existing`.
fn fresh_id(existing: impl Iterator<Item = Uuid> + Clone) -> Uuid {
    loop {
        let candidate = Uuid::new_v4();
        if !existing.clone().any(|id| id == candidate) {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;
    use crate::storage::MemoryStorage;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    fn store_at(storage: MemoryStorage) -> (DataStore, FixedClock) {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
        let store = DataStore::open(
            Box::new(storage),
            Box::new(clock.clone()),
            DEFAULT_STORAGE_KEY,
        );
        (store, clock)
    }

    fn coffee(category_id: Uuid) -> NewTransaction {
        NewTransaction::new(
            12.5,
            "Coffee",
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            category_id,
        )
    }

    #[test]
    fn empty_storage_seeds_and_persists_defaults() {
        let storage = MemoryStorage::new();
        let (store, _) = store_at(storage.clone());
        assert!(!store.is_loading());
        assert_eq!(store.categories().len(), default_categories().len());
        assert!(store
            .categories()
            .iter()
            .all(|c| c.is_default && c.created_at == c.updated_at));

        let saved = storage.read(DEFAULT_STORAGE_KEY).unwrap().expect("seed persisted");
        let envelope = StoreEnvelope::from_json(&saved).unwrap();
        assert_eq!(envelope.categories.len(), store.categories().len());
    }

    #[test]
    fn corrupt_snapshot_falls_back_to_defaults() {
        let storage = MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, "{not json");
        let (store, _) = store_at(storage);
        assert!(store.expenses().is_empty());
        assert_eq!(store.categories().len(), default_categories().len());
    }

    #[test]
    fn new_store_does_not_persist_until_loaded() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(Utc::now());
        let mut store = DataStore::new(
            Box::new(storage.clone()),
            Box::new(clock),
            DEFAULT_STORAGE_KEY,
        );
        assert!(store.is_loading());
        store.add_expense(coffee(Uuid::new_v4()));
        assert_eq!(storage.read(DEFAULT_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn update_refreshes_timestamp_and_keeps_created_at() {
        let (mut store, clock) = store_at(MemoryStorage::new());
        let id = store.add_expense(coffee(Uuid::new_v4()));
        let created = store.expense(id).unwrap().created_at;

        clock.advance(Duration::minutes(5));
        store
            .update_expense(
                id,
                TransactionPatch {
                    description: Some("Latte".into()),
                    ..TransactionPatch::default()
                },
            )
            .expect("update expense");

        let updated = store.expense(id).unwrap();
        assert_eq!(updated.description, "Latte");
        assert_eq!(updated.amount, 12.5);
        assert_eq!(updated.created_at, created);
        assert_eq!(updated.updated_at, created + Duration::minutes(5));
    }

    #[test]
    fn missing_ids_report_not_found() {
        let (mut store, _) = store_at(MemoryStorage::new());
        let missing = Uuid::new_v4();
        let err = store
            .update_income(missing, TransactionPatch::default())
            .expect_err("unknown income");
        assert!(matches!(
            err,
            StoreError::NotFound { kind: RecordKind::Income, id } if id == missing
        ));
        assert!(store.delete_expense(missing).is_err());
        assert!(store.delete_category(missing).is_err());
    }

    #[test]
    fn default_category_delete_is_refused() {
        let (mut store, clock) = store_at(MemoryStorage::new());
        let before = store.envelope();
        let target = store.categories()[0].id;

        clock.advance(Duration::hours(1));
        let err = store.delete_category(target).expect_err("default is protected");
        assert!(matches!(err, StoreError::DefaultCategory(_)));
        assert_eq!(store.envelope(), before);
    }

    #[test]
    fn custom_category_is_soft_deleted() {
        let (mut store, _) = store_at(MemoryStorage::new());
        let id = store.add_category(NewCategory::new(
            "Pets",
            "🐶",
            "#795548",
            CategoryKind::Expense,
        ));
        store.delete_category(id).expect("delete custom category");
        assert!(store.categories().iter().all(|c| c.id != id));
        assert!(store.category(id).map(|c| c.is_deleted).unwrap_or(false));
    }

    #[test]
    fn fresh_id_skips_existing_values() {
        let existing = [Uuid::new_v4(), Uuid::new_v4()];
        let id = fresh_id(existing.iter().copied());
        assert!(!existing.contains(&id));
    }
}
