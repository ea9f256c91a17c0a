//! Sealnote CLI - encrypted local notes with passphrase and second-device unlock
//!
//! This is the command-line interface for Sealnote. It provides a
//! user-friendly interface to the core library functionality.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod output;
mod relay_client;
mod security;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use app::AppContext;
use cli::{Cli, Commands};
use errors::{exit_code_for, CliError};

fn init_logging() {
    let filter = EnvFilter::try_from_env("SEALNOTE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let ctx = AppContext::new(cli);
    match &cli.command {
        Commands::Init(args) => commands::handle_init(&ctx, args),
        Commands::Add(args) => commands::handle_add(&ctx, args),
        Commands::Edit(args) => commands::handle_edit(&ctx, args),
        Commands::Show(args) => commands::handle_show(&ctx, args),
        Commands::List(args) => commands::handle_list(&ctx, args),
        Commands::Delete(args) => commands::handle_delete(&ctx, args),
        Commands::Passwd(args) => commands::handle_passwd(&ctx, args),
        Commands::Export(args) => commands::handle_export(&ctx, args),
        Commands::Import(args) => commands::handle_import(&ctx, args),
        Commands::Credential(command) => commands::handle_credential(&ctx, command),
        Commands::UnlockRemote(args) => commands::handle_unlock_remote(&ctx, args),
        Commands::Authenticator(command) => commands::handle_authenticator(&ctx, command),
        Commands::Respond(args) => commands::handle_respond(&ctx, args),
        Commands::Completions { shell } => commands::handle_completions(*shell),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    if let Err(err) = run(&cli) {
        let code = exit_code_for(&err);
        match err.downcast_ref::<CliError>() {
            Some(cli_err) => eprintln!("Error: {}", cli_err),
            None => eprintln!("Error: {:#}", err),
        }
        std::process::exit(code);
    }
}
