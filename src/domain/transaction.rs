//! Expense and income records.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// A dated amount assigned to a category. Expenses and incomes share this
/// shape; which one a record is depends on the collection holding it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub amount: f64,
    pub description: String,
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    /// Not validated against the category list; unknown ids display as
    /// "Uncategorized".
    #[serde(with = "lenient_id", default)]
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_deleted: bool,
}

pub type Expense = Transaction;
pub type Income = Transaction;

impl Transaction {
    /// Builds a fresh, non-deleted record from caller-supplied fields.
    pub fn create(id: Uuid, fields: NewTransaction, now: DateTime<Utc>) -> Self {
        Self {
            id,
            amount: fields.amount,
            description: fields.description,
            date: fields.date,
            category_id: fields.category_id,
            created_at: now,
            updated_at: now,
            is_deleted: false,
        }
    }

    /// Merges the supplied fields and refreshes `updated_at`.
    pub fn apply(&mut self, patch: TransactionPatch, now: DateTime<Utc>) {
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        self.updated_at = now;
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Transaction {
    fn display_label(&self) -> String {
        format!("{} {} {:.2}", self.date, self.description, self.amount)
    }
}

impl SoftDeletable for Transaction {
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.is_deleted = true;
        self.updated_at = now;
    }
}

/// Caller-supplied fields for a new expense or income.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub amount: f64,
    pub description: String,
    pub date: NaiveDate,
    pub category_id: Uuid,
}

impl NewTransaction {
    pub fn new(
        amount: f64,
        description: impl Into<String>,
        date: NaiveDate,
        category_id: Uuid,
    ) -> Self {
        Self {
            amount,
            description: description.into(),
            date,
            category_id,
        }
    }
}

/// Partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub category_id: Option<Uuid>,
}

/// Discriminates the two transaction collections.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Expense,
    Income,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Income => "income",
        };
        f.write_str(label)
    }
}

/// A transaction paired with the collection it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaggedTransaction<'a> {
    pub kind: TransactionKind,
    pub record: &'a Transaction,
}

impl<'a> TaggedTransaction<'a> {
    pub fn expense(record: &'a Transaction) -> Self {
        Self {
            kind: TransactionKind::Expense,
            record,
        }
    }

    pub fn income(record: &'a Transaction) -> Self {
        Self {
            kind: TransactionKind::Income,
            record,
        }
    }

    /// Amount signed for a running balance: incomes positive, expenses negative.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Expense => -self.record.amount,
            TransactionKind::Income => self.record.amount,
        }
    }
}
