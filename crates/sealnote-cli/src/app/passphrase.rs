//! Passphrase handling and master key unlock with retry logic.

use secrecy::ExposeSecret;

use sealnote_core::crypto::MasterKey;
use sealnote_core::vault::{KeyVault, MasterKeyRecord};
use sealnote_core::SealnoteError;

use crate::errors::CliError;
use crate::helpers::{passphrase_from_env, prompt_passphrase};

const MAX_ATTEMPTS: u32 = 3;

/// Unwrap the master key, prompting up to three times on a terminal.
///
/// A passphrase from SEALNOTE_PASSPHRASE gets exactly one attempt.
pub fn unlock_with_retry(
    vault: &KeyVault,
    record: &MasterKeyRecord,
    interactive: bool,
) -> anyhow::Result<MasterKey> {
    if let Some(passphrase) = passphrase_from_env() {
        return match vault.unlock(record, passphrase.expose_secret()) {
            Ok(key) => Ok(key),
            Err(SealnoteError::Authentication) => {
                Err(CliError::auth_failed("Incorrect passphrase.").into())
            }
            Err(err) => Err(err.into()),
        };
    }

    let max_attempts = if interactive { MAX_ATTEMPTS } else { 1 };
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let passphrase = prompt_passphrase(interactive)?;
        match vault.unlock(record, passphrase.expose_secret()) {
            Ok(key) => return Ok(key),
            Err(SealnoteError::Authentication) => {
                let remaining = max_attempts.saturating_sub(attempts);
                if remaining == 0 {
                    return Err(CliError::auth_failed_with_hint(
                        "Too many failed passphrase attempts.",
                        "Hint: If you forgot your passphrase, the notes cannot be recovered.\n      Backups use the same passphrase.",
                    )
                    .into());
                }
                eprintln!(
                    "Incorrect passphrase. {} attempt{} remaining.",
                    remaining,
                    if remaining == 1 { "" } else { "s" }
                );
            }
            Err(err) => return Err(err.into()),
        }
    }
}
