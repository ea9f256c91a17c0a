//! Backup commands: export and import.

use std::io::IsTerminal;
use std::path::Path;

use sealnote_core::backup::{export_backup, import_backup, Backup};
use sealnote_core::storage::SqliteStore;
use sealnote_core::SealnoteError;

use crate::app::AppContext;
use crate::cli::{ExportArgs, ImportArgs};
use crate::errors::CliError;

pub fn handle_export(ctx: &AppContext, args: &ExportArgs) -> anyhow::Result<()> {
    let destination = Path::new(&args.destination);
    if destination.exists() && !args.force {
        if !std::io::stdin().is_terminal() {
            return Err(CliError::invalid_input(format!(
                "{} already exists; pass --force to overwrite",
                destination.display()
            ))
            .into());
        }
        let proceed = dialoguer::Confirm::new()
            .with_prompt(format!("Overwrite {}?", destination.display()))
            .default(false)
            .interact()?;
        if !proceed {
            return Err(anyhow::anyhow!("Export cancelled"));
        }
    }

    let store = ctx.open_store()?;
    let backup = export_backup(&store)?;
    backup.write_file(destination)?;

    if !ctx.quiet() {
        println!(
            "Exported {} note{} to {}",
            backup.notes.len(),
            if backup.notes.len() == 1 { "" } else { "s" },
            destination.display()
        );
    }
    Ok(())
}

pub fn handle_import(ctx: &AppContext, args: &ImportArgs) -> anyhow::Result<()> {
    let backup = Backup::read_file(Path::new(&args.source))?;

    let store_path = ctx.store_path()?;
    if let Some(parent) = store_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let store = SqliteStore::open(&store_path)?;

    let summary = match import_backup(&store, &backup) {
        Ok(summary) => summary,
        Err(SealnoteError::BackupConflict(message)) => {
            return Err(CliError::invalid_input(format!(
                "{}\nThe backup was made with a different master key and cannot be merged.",
                message
            ))
            .into())
        }
        Err(err) => return Err(err.into()),
    };

    if !ctx.quiet() {
        if summary.master_key_installed {
            println!("Installed master key from backup.");
        }
        println!(
            "Imported {} note{}.",
            summary.notes_imported,
            if summary.notes_imported == 1 { "" } else { "s" }
        );
    }
    Ok(())
}
