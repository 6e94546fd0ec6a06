//! Dashboard figures derived from the visible collections.

use chrono::{Datelike, NaiveDate};

use crate::core::services::category_service::CategoryLookup;
use crate::domain::{Category, TaggedTransaction, Transaction};

/// Number of entries shown in the recent activity feed.
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

/// Totals for the current day and month.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeriodTotals {
    pub today_expenses: f64,
    pub month_expenses: f64,
    pub today_income: f64,
    pub month_income: f64,
    /// Month income minus month expenses.
    pub net_balance: f64,
}

/// One slice of the spending-by-category chart.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySlice {
    pub name: String,
    pub color: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CategoryBreakdown {
    NoData,
    Slices(Vec<CategorySlice>),
}

impl CategoryBreakdown {
    pub fn slices(&self) -> &[CategorySlice] {
        match self {
            CategoryBreakdown::NoData => &[],
            CategoryBreakdown::Slices(slices) => slices,
        }
    }
}

pub struct SummaryService;

impl SummaryService {
    pub fn total<'a>(records: impl IntoIterator<Item = &'a Transaction>) -> f64 {
        records.into_iter().map(|txn| txn.amount).sum()
    }

    pub fn first_of_month(date: NaiveDate) -> NaiveDate {
        date.with_day(1).unwrap_or(date)
    }

    /// Records dated on `today`.
    pub fn on_day<'a>(
        records: impl IntoIterator<Item = &'a Transaction>,
        today: NaiveDate,
    ) -> Vec<&'a Transaction> {
        records.into_iter().filter(|txn| txn.date == today).collect()
    }

    /// Records dated on or after the first day of `today`'s month.
    pub fn in_month_of<'a>(
        records: impl IntoIterator<Item = &'a Transaction>,
        today: NaiveDate,
    ) -> Vec<&'a Transaction> {
        let start = Self::first_of_month(today);
        records.into_iter().filter(|txn| txn.date >= start).collect()
    }

    pub fn period_totals<'a>(
        expenses: impl IntoIterator<Item = &'a Transaction>,
        incomes: impl IntoIterator<Item = &'a Transaction>,
        today: NaiveDate,
    ) -> PeriodTotals {
        let expenses: Vec<&Transaction> = expenses.into_iter().collect();
        let incomes: Vec<&Transaction> = incomes.into_iter().collect();
        let today_expenses = Self::total(Self::on_day(expenses.iter().copied(), today));
        let month_expenses = Self::total(Self::in_month_of(expenses.iter().copied(), today));
        let today_income = Self::total(Self::on_day(incomes.iter().copied(), today));
        let month_income = Self::total(Self::in_month_of(incomes.iter().copied(), today));
        PeriodTotals {
            today_expenses,
            month_expenses,
            today_income,
            month_income,
            net_balance: month_income - month_expenses,
        }
    }

    /// Latest transactions across both collections, newest first.
    ///
    /// Expenses are merged ahead of incomes and the sort is stable, so records
    /// sharing a date keep that merge order.
    pub fn recent_activity<'a>(
        expenses: impl IntoIterator<Item = &'a Transaction>,
        incomes: impl IntoIterator<Item = &'a Transaction>,
        limit: usize,
    ) -> Vec<TaggedTransaction<'a>> {
        let mut merged: Vec<TaggedTransaction<'a>> = expenses
            .into_iter()
            .map(TaggedTransaction::expense)
            .chain(incomes.into_iter().map(TaggedTransaction::income))
            .collect();
        merged.sort_by(|a, b| b.record.date.cmp(&a.record.date));
        merged.truncate(limit);
        merged
    }

    /// Sums amounts per resolved category name, largest first.
    pub fn category_breakdown<'a>(
        records: impl IntoIterator<Item = &'a Transaction>,
        categories: impl IntoIterator<Item = &'a Category>,
    ) -> CategoryBreakdown {
        let lookup = CategoryLookup::new(categories);
        let mut slices: Vec<CategorySlice> = Vec::new();
        for txn in records {
            let label = lookup.resolve(txn.category_id);
            match slices.iter_mut().find(|slice| slice.name == label.name) {
                Some(slice) => slice.total += txn.amount,
                None => slices.push(CategorySlice {
                    name: label.name,
                    color: label.color,
                    total: txn.amount,
                }),
            }
        }
        if slices.is_empty() {
            return CategoryBreakdown::NoData;
        }
        slices.sort_by(|a, b| b.total.total_cmp(&a.total));
        CategoryBreakdown::Slices(slices)
    }
}
