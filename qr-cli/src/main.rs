use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use qr_profiles::{
    Config, FileStore, OwnerId, ProfileSetManager, Scanner, CONFIG_FILE,
};

use crate::cli::Cli;
use crate::commands::Context;
use crate::error::AppError;

mod cli;
mod commands;
mod error;
mod parsers;

const STORE_LABEL: &str = "qr-cli";

fn build_context(args: &Cli) -> Result<Context, AppError> {
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let config = Config::load_or_default(&config_path)
        .and_then(Config::with_env_overrides)
        .map_err(|e| AppError::ConfigLoadError(e.to_string()))?;

    let store = FileStore::new(STORE_LABEL.to_owned(), &config.storage_root)
        .map_err(|e| AppError::StorageOpenError(e.to_string()))?;
    let store = Arc::new(store);
    log::debug!("using storage at {}", config.storage_root.display());

    let owner = args
        .owner
        .as_deref()
        .map(OwnerId::new)
        .transpose()?;

    Ok(Context {
        config,
        owner,
        manager: ProfileSetManager::new(store.clone()),
        scanner: Scanner::new(store),
    })
}

fn main() {
    env_logger::init();

    let args = Cli::parse();

    let result = build_context(&args).and_then(|ctx| args.command.run(&ctx));
    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
