//! `sealnote init`: create the store and the master key record.

use std::io::IsTerminal;
use std::path::PathBuf;

use secrecy::ExposeSecret;

use sealnote_core::storage::SqliteStore;
use sealnote_core::vault::{load_record, save_record, KeyVault};

use crate::app::{resolve_config_path, AppContext};
use crate::cli::InitArgs;
use crate::config::write_config;
use crate::errors::CliError;
use crate::helpers::prompt_new_passphrase;

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let store_path = match args.path.as_deref() {
        Some(path) => PathBuf::from(path),
        None => ctx.store_path()?,
    };

    if store_path.exists() {
        let store = SqliteStore::open(&store_path)?;
        if load_record(&store)?.is_some() {
            return Err(CliError::invalid_input(format!(
                "A store already exists at {}",
                store_path.display()
            ))
            .into());
        }
    }

    let iterations = args.iterations.unwrap_or(ctx.config()?.vault.iterations);
    let vault = KeyVault::new(iterations)?;

    let interactive = std::io::stdin().is_terminal() && !args.no_input;
    let passphrase = prompt_new_passphrase("SEALNOTE_PASSPHRASE", interactive)?;
    let (_master_key, record) = vault.setup(passphrase.expose_secret())?;

    if let Some(parent) = store_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!("Failed to create directory {}: {}", parent.display(), e)
            })?;
        }
    }
    let store = SqliteStore::open(&store_path)?;
    save_record(&store, &record)?;

    let config_path = resolve_config_path()?;
    if !config_path.exists() {
        let mut config = ctx.config()?.clone();
        config.store.path = Some(store_path.to_string_lossy().to_string());
        config.vault.iterations = iterations;
        write_config(&config_path, &config)?;
    }

    if !ctx.quiet() {
        println!("Initialized new store at {}", store_path.display());
        println!("Key lineage: {}", record.lineage_id());
        println!("There is no way to recover a forgotten passphrase. Export backups regularly.");
    }
    Ok(())
}
