pub mod commands;
pub mod output;

use std::env;

use crate::config::ConfigManager;
use crate::core::{DataStore, SystemClock};
use crate::errors::Result;
use crate::storage::JsonStorage;
use crate::utils::build_info;

pub use commands::{execute, parse_command, Command, USAGE};

/// Parses process arguments and runs one command against the on-disk store.
pub fn run_cli() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let command = parse_command(&args)?;
    match command {
        Command::Help => {
            println!("{USAGE}");
            return Ok(());
        }
        Command::Version => {
            println!("{}", build_info::current().summary());
            return Ok(());
        }
        _ => {}
    }

    let config = ConfigManager::new()?.load()?.with_env_overrides();
    let storage = JsonStorage::new_default()?;
    let mut store = DataStore::open(
        Box::new(storage),
        Box::new(SystemClock),
        config.storage_key.clone(),
    );
    execute(command, &mut store, &config)
}
