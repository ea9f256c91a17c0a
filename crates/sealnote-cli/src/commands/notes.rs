//! Note commands: add, edit, show, list, delete.

use std::io::IsTerminal;

use sealnote_core::notes::NoteBook;
use sealnote_core::SealnoteError;

use crate::app::AppContext;
use crate::cli::{AddArgs, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::helpers::{parse_note_id, read_note_text};
use crate::output::{note_json, notes_json, print_note, print_note_list, ListedNote};

pub fn handle_add(ctx: &AppContext, args: &AddArgs) -> anyhow::Result<()> {
    let text = read_note_text(args.no_input, args.text.clone())?;
    let (store, master_key) = ctx.unlock(args.no_input)?;
    let note = NoteBook::new(&store, &master_key).create(&text)?;
    if !ctx.quiet() {
        println!("Added note {}", note.id);
    }
    Ok(())
}

pub fn handle_edit(ctx: &AppContext, args: &EditArgs) -> anyhow::Result<()> {
    let id = parse_note_id(&args.id)?;
    let (store, master_key) = ctx.unlock(args.no_input)?;
    let book = NoteBook::new(&store, &master_key);
    book.get(&id)?;

    let text = read_note_text(args.no_input, args.text.clone())?;
    let note = book.update(&id, &text)?;
    if !ctx.quiet() {
        println!("Updated note {}", note.id);
    }
    Ok(())
}

pub fn handle_show(ctx: &AppContext, args: &ShowArgs) -> anyhow::Result<()> {
    let id = parse_note_id(&args.id)?;
    let (store, master_key) = ctx.unlock(args.no_input)?;
    let note = NoteBook::new(&store, &master_key).read(&id)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&note_json(&note))?);
    } else {
        print_note(&note, ctx.quiet());
    }
    Ok(())
}

pub fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    let (store, master_key) = ctx.unlock(args.no_input)?;
    let book = NoteBook::new(&store, &master_key);

    let mut stored = book.list()?;
    if let Some(limit) = args.limit {
        stored.truncate(limit);
    }
    let mut notes = Vec::with_capacity(stored.len());
    for note in &stored {
        match book.decrypt(note) {
            Ok(decrypted) => notes.push(ListedNote::Readable(decrypted)),
            Err(SealnoteError::Integrity) => {
                tracing::warn!(note_id = %note.id, "note cannot be decrypted");
                notes.push(ListedNote::Unreadable {
                    id: note.id,
                    updated_at: note.updated_at,
                });
            }
            Err(err) => return Err(err.into()),
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&notes_json(&notes))?);
    } else {
        print_note_list(&notes, ctx.quiet());
    }
    Ok(())
}

pub fn handle_delete(ctx: &AppContext, args: &DeleteArgs) -> anyhow::Result<()> {
    let id = parse_note_id(&args.id)?;
    let (store, master_key) = ctx.unlock(false)?;
    let book = NoteBook::new(&store, &master_key);
    book.get(&id)?;

    if !args.force && std::io::stdin().is_terminal() {
        let proceed = dialoguer::Confirm::new()
            .with_prompt(format!("Delete note {}?", id))
            .default(false)
            .interact()?;
        if !proceed {
            return Err(anyhow::anyhow!("Delete cancelled"));
        }
    }

    book.delete(&id)?;
    if !ctx.quiet() {
        println!("Deleted note {}", id);
    }
    Ok(())
}
