pub mod category_service;
pub mod summary_service;
pub mod transaction_service;

pub use category_service::{CategoryLabel, CategoryLookup, CategoryService};
pub use summary_service::{
    CategoryBreakdown, CategorySlice, PeriodTotals, SummaryService, RECENT_ACTIVITY_LIMIT,
};
pub use transaction_service::{CategoryFilter, TransactionFilter, TransactionService};
