//! Output formatting helpers for the CLI.

use uuid::Uuid;

use sealnote_core::notes::DecryptedNote;
use sealnote_core::webauthn::Credential;

use crate::helpers::format_timestamp;

const SUMMARY_WIDTH: usize = 60;
const UNREADABLE: &str = "cannot decrypt";

/// A row of `sealnote list`. Undecryptable notes stay visible.
pub enum ListedNote {
    Readable(DecryptedNote),
    Unreadable { id: Uuid, updated_at: i64 },
}

/// First line of a note, shortened for list views.
pub fn note_summary(note: &DecryptedNote) -> String {
    let first_line = note.text.lines().next().unwrap_or("");
    if first_line.chars().count() > SUMMARY_WIDTH {
        let cut: String = first_line.chars().take(SUMMARY_WIDTH - 3).collect();
        format!("{}...", cut)
    } else {
        first_line.to_string()
    }
}

pub fn note_json(note: &DecryptedNote) -> serde_json::Value {
    serde_json::json!({
        "id": note.id,
        "text": note.text,
        "created_at": format_timestamp(note.created_at),
        "updated_at": format_timestamp(note.updated_at),
    })
}

pub fn notes_json(notes: &[ListedNote]) -> Vec<serde_json::Value> {
    notes
        .iter()
        .map(|listed| match listed {
            ListedNote::Readable(note) => note_json(note),
            ListedNote::Unreadable { id, updated_at } => serde_json::json!({
                "id": id,
                "updated_at": format_timestamp(*updated_at),
                "error": UNREADABLE,
            }),
        })
        .collect()
}

/// Print a single note in human-readable format.
pub fn print_note(note: &DecryptedNote, quiet: bool) {
    if !quiet {
        println!("ID: {}", note.id);
        println!("Created: {}", format_timestamp(note.created_at));
        if note.updated_at != note.created_at {
            println!("Updated: {}", format_timestamp(note.updated_at));
        }
        println!();
    }
    println!("{}", note.text);
}

pub fn print_note_list(notes: &[ListedNote], quiet: bool) {
    if !quiet {
        println!("ID | UPDATED_AT | SUMMARY");
    }
    for listed in notes {
        match listed {
            ListedNote::Readable(note) => println!(
                "{} | {} | {}",
                note.id,
                format_timestamp(note.updated_at),
                note_summary(note)
            ),
            ListedNote::Unreadable { id, updated_at } => println!(
                "{} | {} | <{}>",
                id,
                format_timestamp(*updated_at),
                UNREADABLE
            ),
        }
    }
}

pub fn credential_json(credential: &Credential) -> serde_json::Value {
    serde_json::json!({
        "id": credential.id,
        "counter": credential.counter,
        "created_at": format_timestamp(credential.created_at),
    })
}

pub fn print_credential_list(credentials: &[Credential], quiet: bool) {
    if !quiet {
        println!("ID | COUNTER | CREATED_AT");
    }
    for credential in credentials {
        println!(
            "{} | {} | {}",
            credential.id,
            credential.counter,
            format_timestamp(credential.created_at)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(text: &str) -> DecryptedNote {
        DecryptedNote {
            id: Uuid::new_v4(),
            text: text.to_string(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_summary_uses_first_line() {
        assert_eq!(note_summary(&note("title\nbody")), "title");
        assert_eq!(note_summary(&note("")), "");
    }

    #[test]
    fn test_summary_truncates_long_lines() {
        let summary = note_summary(&note(&"x".repeat(100)));
        assert_eq!(summary.chars().count(), SUMMARY_WIDTH);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn test_note_json_shape() {
        let value = note_json(&note("hello"));
        assert_eq!(value["text"], "hello");
        assert_eq!(value["created_at"], "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_unreadable_note_json() {
        let id = Uuid::new_v4();
        let values = notes_json(&[
            ListedNote::Readable(note("fine")),
            ListedNote::Unreadable { id, updated_at: 0 },
        ]);
        assert_eq!(values[0]["text"], "fine");
        assert_eq!(values[1]["id"], id.to_string());
        assert_eq!(values[1]["error"], "cannot decrypt");
        assert!(values[1].get("text").is_none());
    }
}
