pub mod category;
pub mod common;
pub mod defaults;
pub mod envelope;
pub mod transaction;

pub use category::{Category, CategoryKind, CategoryPatch, NewCategory};
pub use common::{Displayable, Identifiable, SoftDeletable};
pub use envelope::StoreEnvelope;
pub use transaction::{
    Expense, Income, NewTransaction, TaggedTransaction, Transaction, TransactionKind,
    TransactionPatch,
};
