//! Remote unlock: the waiting side (`unlock-remote`) and the answering
//! side (`authenticator`, `respond`).

use std::io::Write;
use std::time::Duration;

use sealnote_core::encoding::decode_b64url;
use sealnote_core::relay::SESSION_TTL;
use sealnote_core::unlock::{respond, RemoteUnlock, RemoteUnlockOutcome, UnlockConfig, UnlockRequest};
use sealnote_core::webauthn::{CredentialRegistry, SoftwareAuthenticator};

use crate::app::AppContext;
use crate::cli::{AuthenticatorCommand, RespondArgs, UnlockRemoteArgs};
use crate::errors::CliError;
use crate::relay_client::HttpRelayClient;
use crate::security::{read_authenticator, write_authenticator};

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to start async runtime: {}", e))
}

pub fn handle_unlock_remote(ctx: &AppContext, args: &UnlockRemoteArgs) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let registry = CredentialRegistry::new(&store);
    if registry.list()?.is_empty() {
        return Err(CliError::not_found(
            "No unlock credentials are registered.",
            "Run:\n  sealnote credential challenge",
        )
        .into());
    }

    let relay_config = &ctx.config()?.relay;
    let relay_url = args.relay.clone().unwrap_or_else(|| relay_config.url.clone());
    let mut unlock_config =
        UnlockConfig::new(relay_url.clone()).with_poll_interval(relay_config.poll_interval());
    unlock_config.timeout = Duration::from_secs(args.timeout).min(SESSION_TTL);

    let orchestrator = RemoteUnlock::new(
        HttpRelayClient::new(&relay_url)?,
        ctx.verifier()?,
        unlock_config,
    );

    let outcome = runtime()?.block_on(async {
        let pending = orchestrator.begin().await?;
        println!("{}", pending.uri());
        std::io::stdout().flush()?;
        if !ctx.quiet() {
            eprintln!("Open this link on your second device, or run there:\n  sealnote respond '<link>'");
            eprintln!("Waiting up to {}s (Ctrl+C to cancel)...", args.timeout.min(SESSION_TTL.as_secs()));
        }

        let cancel = pending.cancel_handle();
        let ctrl_c = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
        let outcome = orchestrator.wait(pending, &registry).await;
        ctrl_c.abort();
        anyhow::Ok(outcome?)
    })?;

    match outcome {
        RemoteUnlockOutcome::Authenticated {
            credential_id,
            sign_count,
        } => {
            if !ctx.quiet() {
                println!(
                    "Authenticated with credential {} (counter {})",
                    credential_id, sign_count
                );
            }
            Ok(())
        }
        RemoteUnlockOutcome::Rejected { reason } => {
            Err(CliError::auth_failed(format!("Remote unlock rejected: {}", reason)).into())
        }
        RemoteUnlockOutcome::TimedOut => Err(CliError::auth_failed_with_hint(
            "Remote unlock timed out.",
            "No answer arrived before the session expired.",
        )
        .into()),
        RemoteUnlockOutcome::Cancelled => Err(anyhow::anyhow!("Remote unlock cancelled")),
    }
}

pub fn handle_authenticator(
    ctx: &AppContext,
    command: &AuthenticatorCommand,
) -> anyhow::Result<()> {
    let path = ctx.authenticator_path()?;
    match command {
        AuthenticatorCommand::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::invalid_input(format!(
                    "An authenticator key already exists at {}; pass --force to replace it",
                    path.display()
                ))
                .into());
            }
            let authenticator = SoftwareAuthenticator::generate(&ctx.config()?.relay.rp_id)?;
            write_authenticator(&path, &authenticator)?;
            if !ctx.quiet() {
                println!("Created authenticator {}", authenticator.credential_id());
            }
            Ok(())
        }
        AuthenticatorCommand::Register { challenge } => {
            decode_b64url(challenge)
                .map_err(|_| CliError::invalid_input("Challenge must be base64url"))?;
            let authenticator = read_authenticator(&path)?;
            let response = authenticator.register(challenge, &ctx.config()?.relay.origin)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        AuthenticatorCommand::Show => {
            let authenticator = read_authenticator(&path)?;
            println!("Credential: {}", authenticator.credential_id());
            println!("Counter: {}", authenticator.sign_count());
            Ok(())
        }
    }
}

pub fn handle_respond(ctx: &AppContext, args: &RespondArgs) -> anyhow::Result<()> {
    let request = UnlockRequest::parse(&args.uri)?;
    let path = ctx.authenticator_path()?;
    let mut authenticator = read_authenticator(&path)?;
    let client = HttpRelayClient::new(&request.relay_url)?;
    let origin = ctx.config()?.relay.origin.clone();

    let result = runtime()?.block_on(respond(&client, &request, &mut authenticator, &origin));
    // The counter may have advanced even if the relay refused the answer.
    write_authenticator(&path, &authenticator)?;
    result?;

    if !ctx.quiet() {
        println!("Unlock request answered.");
    }
    Ok(())
}
