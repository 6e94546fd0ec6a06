#![doc(test(attr(deny(warnings))))]

//! Expense Core holds the data store, dashboard aggregations, and AI parsing
//! assist behind a personal expense and income tracker.

pub mod assist;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

pub use crate::core::store::DataStore;
pub use crate::errors::{Result, StoreError};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Expense Core tracing initialized.");
    });
}
