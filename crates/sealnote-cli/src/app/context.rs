//! Application context for the Sealnote CLI.
//!
//! Provides a unified context that combines CLI arguments with
//! lazily-loaded configuration.

use std::io::IsTerminal;
use std::path::PathBuf;

use once_cell::unsync::OnceCell;

use sealnote_core::crypto::MasterKey;
use sealnote_core::storage::SqliteStore;
use sealnote_core::vault::{load_record, KeyVault};
use sealnote_core::webauthn::{CredentialVerifier, VerifierConfig};

use crate::cli::Cli;
use crate::config::{default_authenticator_path, SealnoteConfig};
use crate::errors::CliError;

use super::passphrase::unlock_with_retry;
use super::resolver::{load_config, missing_store_message, resolve_store_path};

/// Application context that bundles CLI args with configuration.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<SealnoteConfig>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
        }
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Get the configuration, loading it lazily if needed.
    pub fn config(&self) -> anyhow::Result<&SealnoteConfig> {
        self.config.get_or_try_init(load_config)
    }

    pub fn store_path(&self) -> anyhow::Result<PathBuf> {
        resolve_store_path(self.cli, self.config()?)
    }

    /// Open an existing store. Never creates one.
    pub fn open_store(&self) -> anyhow::Result<SqliteStore> {
        let path = self.store_path()?;
        if !path.exists() {
            return Err(CliError::not_found(missing_store_message(&path), "").into());
        }
        tracing::debug!(path = %path.display(), "opening store");
        Ok(SqliteStore::open(&path)?)
    }

    pub fn vault(&self) -> anyhow::Result<KeyVault> {
        Ok(KeyVault::new(self.config()?.vault.iterations)?)
    }

    /// Open the store and unwrap the master key.
    pub fn unlock(&self, no_input: bool) -> anyhow::Result<(SqliteStore, MasterKey)> {
        let store = self.open_store()?;
        let record = load_record(&store)?.ok_or_else(|| {
            CliError::not_found(
                "Store has no master key.",
                "Run `sealnote init` or import a backup that carries one.",
            )
        })?;
        let interactive = std::io::stdin().is_terminal() && !no_input;
        let master_key = unlock_with_retry(&self.vault()?, &record, interactive)?;
        Ok((store, master_key))
    }

    pub fn verifier(&self) -> anyhow::Result<CredentialVerifier> {
        let relay = &self.config()?.relay;
        Ok(CredentialVerifier::new(
            VerifierConfig::new(relay.origin.clone()).with_rp_id(relay.rp_id.clone()),
        ))
    }

    pub fn authenticator_path(&self) -> anyhow::Result<PathBuf> {
        match self.config()?.relay.authenticator_path.as_deref() {
            Some(path) => Ok(PathBuf::from(path)),
            None => default_authenticator_path(),
        }
    }
}
