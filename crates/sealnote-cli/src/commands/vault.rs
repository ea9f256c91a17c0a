//! `sealnote passwd`: re-wrap the master key under a new passphrase.

use std::io::IsTerminal;

use secrecy::ExposeSecret;

use sealnote_core::vault::{load_record, save_record};
use sealnote_core::SealnoteError;

use crate::app::AppContext;
use crate::cli::PasswdArgs;
use crate::errors::CliError;
use crate::helpers::{prompt_new_passphrase, prompt_passphrase};

pub fn handle_passwd(ctx: &AppContext, args: &PasswdArgs) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let record = load_record(&store)?.ok_or_else(|| {
        CliError::not_found("Store has no master key.", "Run `sealnote init` first.")
    })?;
    let interactive = std::io::stdin().is_terminal() && !args.no_input;

    let current = prompt_passphrase(interactive)?;
    let new_passphrase = prompt_new_passphrase("SEALNOTE_NEW_PASSPHRASE", interactive)?;

    let vault = ctx.vault()?;
    let new_record = match vault.change_passphrase(
        &record,
        current.expose_secret(),
        new_passphrase.expose_secret(),
    ) {
        Ok(new_record) => new_record,
        Err(SealnoteError::Authentication) => {
            return Err(CliError::auth_failed("Incorrect passphrase.").into())
        }
        Err(err) => return Err(err.into()),
    };
    save_record(&store, &new_record)?;

    if !ctx.quiet() {
        println!("Passphrase changed.");
        println!(
            "Backups exported before this change belong to key lineage {} and can no longer be imported here.",
            record.lineage_id()
        );
    }
    Ok(())
}
