pub mod services;
pub mod store;
pub mod time;
pub mod utils;

pub use store::{DataStore, DEFAULT_STORAGE_KEY};
pub use time::{Clock, FixedClock, SystemClock};
