//! Filtering for the transaction list.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::Transaction;

/// Category restriction for the transaction list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Uuid),
}

/// Criteria selected in the transaction list view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub category: CategoryFilter,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl TransactionFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category_id: Uuid) -> Self {
        self.category = CategoryFilter::Only(category_id);
        self
    }

    pub fn with_start(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }

    /// A start date without an end date selects that single day; otherwise
    /// the bounds are inclusive and either may be open.
    pub fn matches(&self, txn: &Transaction) -> bool {
        if let CategoryFilter::Only(category_id) = self.category {
            if txn.category_id != category_id {
                return false;
            }
        }
        match (self.start, self.end) {
            (Some(start), None) => txn.date == start,
            (start, end) => {
                start.map_or(true, |start| txn.date >= start)
                    && end.map_or(true, |end| txn.date <= end)
            }
        }
    }
}

pub struct TransactionService;

impl TransactionService {
    /// Records matching `filter`, newest first.
    pub fn filter<'a>(
        records: impl IntoIterator<Item = &'a Transaction>,
        filter: &TransactionFilter,
    ) -> Vec<&'a Transaction> {
        let mut matched: Vec<&Transaction> = records
            .into_iter()
            .filter(|txn| filter.matches(txn))
            .collect();
        matched.sort_by(|a, b| b.date.cmp(&a.date));
        matched
    }
}
