//! Encrypted note collection over a key-value store.

use chrono::Utc;
use uuid::Uuid;

use super::cipher::{decrypt, encrypt};
use super::types::{DecryptedNote, Note};
use crate::crypto::MasterKey;
use crate::error::{Result, SealnoteError};
use crate::storage::{KeyValueStore, KeyValueStoreExt, NOTES_INDEX, NOTES_TABLE};

/// Note operations for an unlocked vault.
///
/// Holding a `NoteBook` requires a [`MasterKey`], so every operation here
/// runs after a successful unlock.
pub struct NoteBook<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
    master_key: &'a MasterKey,
}

impl<'a, S: KeyValueStore + ?Sized> NoteBook<'a, S> {
    pub fn new(store: &'a S, master_key: &'a MasterKey) -> Self {
        Self { store, master_key }
    }

    /// Encrypt and store a new note.
    pub fn create(&self, text: &str) -> Result<Note> {
        let body = encrypt(text, self.master_key)?;
        let now = Utc::now().timestamp_millis();
        let note = Note {
            id: Uuid::new_v4(),
            ciphertext: body.ciphertext,
            iv: body.iv.to_vec(),
            created_at: now,
            updated_at: now,
        };
        self.store.put_record(NOTES_TABLE, &note.id.to_string(), &note)?;
        tracing::debug!(note_id = %note.id, "note created");
        Ok(note)
    }

    /// Re-encrypt a note with new text and a fresh iv.
    pub fn update(&self, id: &Uuid, text: &str) -> Result<Note> {
        let existing = self.get(id)?;
        let body = encrypt(text, self.master_key)?;
        // Strictly increasing even when two edits land in the same millisecond.
        let updated_at = Utc::now()
            .timestamp_millis()
            .max(existing.updated_at.saturating_add(1));
        let note = Note {
            id: existing.id,
            ciphertext: body.ciphertext,
            iv: body.iv.to_vec(),
            created_at: existing.created_at,
            updated_at,
        };
        self.store.put_record(NOTES_TABLE, &note.id.to_string(), &note)?;
        tracing::debug!(note_id = %note.id, "note updated");
        Ok(note)
    }

    /// Fetch a note without decrypting it.
    pub fn get(&self, id: &Uuid) -> Result<Note> {
        self.store
            .get_record(NOTES_TABLE, &id.to_string())?
            .ok_or_else(|| SealnoteError::NotFound(format!("note {}", id)))
    }

    /// Fetch and decrypt a note.
    pub fn read(&self, id: &Uuid) -> Result<DecryptedNote> {
        let note = self.get(id)?;
        self.decrypt(&note)
    }

    /// Decrypt an already-fetched note.
    pub fn decrypt(&self, note: &Note) -> Result<DecryptedNote> {
        let text = decrypt(&note.ciphertext, &note.iv, self.master_key)?;
        Ok(DecryptedNote {
            id: note.id,
            text,
            created_at: note.created_at,
            updated_at: note.updated_at,
        })
    }

    /// All notes, most recently updated first.
    pub fn list(&self) -> Result<Vec<Note>> {
        let mut notes: Vec<Note> = self.store.list_records(NOTES_TABLE, NOTES_INDEX)?;
        notes.reverse();
        Ok(notes)
    }

    /// Remove a note.
    pub fn delete(&self, id: &Uuid) -> Result<()> {
        if !self.store.delete(NOTES_TABLE, &id.to_string())? {
            return Err(SealnoteError::NotFound(format!("note {}", id)));
        }
        tracing::debug!(note_id = %id, "note deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_create_and_read() {
        let store = MemoryStore::new();
        let key = MasterKey::generate().unwrap();
        let book = NoteBook::new(&store, &key);

        let note = book.create("first note").unwrap();
        assert_eq!(note.created_at, note.updated_at);

        let read = book.read(&note.id).unwrap();
        assert_eq!(read.text, "first note");
        assert_eq!(read.id, note.id);
    }

    #[test]
    fn test_stored_value_has_no_plaintext() {
        let store = MemoryStore::new();
        let key = MasterKey::generate().unwrap();
        let book = NoteBook::new(&store, &key);

        let note = book.create("top secret words").unwrap();
        let raw = store.get(NOTES_TABLE, &note.id.to_string()).unwrap().unwrap();
        assert!(!raw.to_string().contains("top secret"));
        assert!(raw.get("updatedAt").is_some());
    }

    #[test]
    fn test_update_reencrypts_and_bumps_timestamp() {
        let store = MemoryStore::new();
        let key = MasterKey::generate().unwrap();
        let book = NoteBook::new(&store, &key);

        let note = book.create("v1").unwrap();
        let updated = book.update(&note.id, "v2").unwrap();

        assert_eq!(updated.id, note.id);
        assert_eq!(updated.created_at, note.created_at);
        assert!(updated.updated_at > note.updated_at);
        assert_ne!(updated.iv, note.iv);
        assert_eq!(book.read(&note.id).unwrap().text, "v2");
    }

    #[test]
    fn test_list_newest_first() {
        let store = MemoryStore::new();
        let key = MasterKey::generate().unwrap();
        let book = NoteBook::new(&store, &key);

        for (i, updated_at) in [200_i64, 300, 100].into_iter().enumerate() {
            let body = encrypt(&format!("note {}", i), &key).unwrap();
            let note = Note {
                id: Uuid::new_v4(),
                ciphertext: body.ciphertext,
                iv: body.iv.to_vec(),
                created_at: 50,
                updated_at,
            };
            store
                .put_record(NOTES_TABLE, &note.id.to_string(), &note)
                .unwrap();
        }

        let order: Vec<i64> = book.list().unwrap().iter().map(|n| n.updated_at).collect();
        assert_eq!(order, vec![300, 200, 100]);
    }

    #[test]
    fn test_missing_note() {
        let store = MemoryStore::new();
        let key = MasterKey::generate().unwrap();
        let book = NoteBook::new(&store, &key);
        let id = Uuid::new_v4();

        assert!(matches!(book.read(&id), Err(SealnoteError::NotFound(_))));
        assert!(matches!(book.update(&id, "x"), Err(SealnoteError::NotFound(_))));
        assert!(matches!(book.delete(&id), Err(SealnoteError::NotFound(_))));
    }

    #[test]
    fn test_delete() {
        let store = MemoryStore::new();
        let key = MasterKey::generate().unwrap();
        let book = NoteBook::new(&store, &key);

        let note = book.create("gone soon").unwrap();
        book.delete(&note.id).unwrap();
        assert!(book.list().unwrap().is_empty());
    }

    #[test]
    fn test_wrong_key_cannot_read() {
        let store = MemoryStore::new();
        let key = MasterKey::generate().unwrap();
        let other = MasterKey::generate().unwrap();

        let note = NoteBook::new(&store, &key).create("mine").unwrap();
        let err = NoteBook::new(&store, &other).read(&note.id).unwrap_err();
        assert!(matches!(err, SealnoteError::Integrity));
    }
}
