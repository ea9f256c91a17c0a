//! Credential commands: challenge, register, list, remove.
//!
//! Registration is two steps. `credential challenge` stores a fresh
//! challenge in the store's meta table; the second device answers it with
//! `authenticator register`, and `credential register` verifies the answer
//! against the stored challenge and consumes it.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use sealnote_core::crypto::random_challenge;
use sealnote_core::encoding::decode_b64url;
use sealnote_core::storage::{KeyValueStore, KeyValueStoreExt, SqliteStore, META_TABLE};
use sealnote_core::webauthn::{CredentialRegistry, RegistrationResponse};
use sealnote_core::SealnoteError;

use crate::app::AppContext;
use crate::cli::CredentialCommand;
use crate::constants::REGISTRATION_CHALLENGE_TTL_SECONDS;
use crate::errors::CliError;
use crate::helpers::read_input;
use crate::output::{credential_json, print_credential_list};

const PENDING_REGISTRATION_KEY: &str = "pendingRegistration";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PendingRegistration {
    challenge: String,
    /// Unix milliseconds
    created_at: i64,
}

pub fn handle_credential(ctx: &AppContext, command: &CredentialCommand) -> anyhow::Result<()> {
    match command {
        CredentialCommand::Challenge => handle_challenge(ctx),
        CredentialCommand::Register { response } => handle_register(ctx, response),
        CredentialCommand::List { json } => handle_list(ctx, *json),
        CredentialCommand::Remove { id } => handle_remove(ctx, id),
    }
}

fn handle_challenge(ctx: &AppContext) -> anyhow::Result<()> {
    // Only the passphrase holder may enrol new unlock credentials.
    let (store, _master_key) = ctx.unlock(false)?;
    let pending = PendingRegistration {
        challenge: random_challenge()?,
        created_at: Utc::now().timestamp_millis(),
    };
    store.put_record(META_TABLE, PENDING_REGISTRATION_KEY, &pending)?;

    println!("{}", pending.challenge);
    if !ctx.quiet() {
        eprintln!(
            "On the second device run:\n  sealnote authenticator register {} > response.json\nthen here:\n  sealnote credential register response.json",
            pending.challenge
        );
    }
    Ok(())
}

fn take_pending(store: &SqliteStore) -> anyhow::Result<PendingRegistration> {
    let pending: PendingRegistration = store
        .get_record(META_TABLE, PENDING_REGISTRATION_KEY)?
        .ok_or_else(|| {
            CliError::not_found(
                "No registration challenge is pending.",
                "Run:\n  sealnote credential challenge",
            )
        })?;
    store.delete(META_TABLE, PENDING_REGISTRATION_KEY)?;

    let age_ms = Utc::now().timestamp_millis() - pending.created_at;
    if age_ms > REGISTRATION_CHALLENGE_TTL_SECONDS * 1000 {
        return Err(CliError::not_found(
            "The registration challenge has expired.",
            "Run:\n  sealnote credential challenge",
        )
        .into());
    }
    Ok(pending)
}

fn handle_register(ctx: &AppContext, response_path: &str) -> anyhow::Result<()> {
    let raw = read_input(response_path)?;
    let response: RegistrationResponse = serde_json::from_str(&raw).map_err(|e| {
        CliError::invalid_input(format!("Malformed registration response: {}", e))
    })?;

    let (store, _master_key) = ctx.unlock(response_path == "-")?;
    let pending = take_pending(&store)?;
    let challenge = decode_b64url(&pending.challenge)
        .map_err(|_| anyhow::anyhow!("Stored registration challenge is corrupt"))?;

    let attested = ctx
        .verifier()?
        .verify_registration(&response, &challenge)
        .map_err(SealnoteError::from)?;
    let credential = CredentialRegistry::new(&store).register(&attested)?;

    if !ctx.quiet() {
        println!("Registered credential {}", credential.id);
    }
    Ok(())
}

fn handle_list(ctx: &AppContext, json: bool) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let credentials = CredentialRegistry::new(&store).list()?;
    if json {
        let values: Vec<_> = credentials.iter().map(credential_json).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
    } else {
        print_credential_list(&credentials, ctx.quiet());
    }
    Ok(())
}

fn handle_remove(ctx: &AppContext, id: &str) -> anyhow::Result<()> {
    let (store, _master_key) = ctx.unlock(false)?;
    CredentialRegistry::new(&store).remove(id)?;
    if !ctx.quiet() {
        println!("Removed credential {}", id);
    }
    Ok(())
}
