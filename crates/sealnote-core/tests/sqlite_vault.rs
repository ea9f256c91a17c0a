use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use sealnote_core::backup::{export_backup, import_backup, Backup};
use sealnote_core::crypto::MIN_ITERATIONS;
use sealnote_core::notes::NoteBook;
use sealnote_core::storage::SqliteStore;
use sealnote_core::vault::{load_record, save_record, KeyVault};
use sealnote_core::SealnoteError;

struct TempFile {
    path: PathBuf,
}

impl TempFile {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be available")
            .as_nanos();
        let filename = format!("{}_{}_{}.db", prefix, std::process::id(), nanos);
        let path = std::env::temp_dir().join(filename);
        Self { path }
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn vault() -> KeyVault {
    KeyVault::new(MIN_ITERATIONS).expect("iterations should be valid")
}

#[test]
fn test_setup_write_reopen_read() {
    let temp = TempFile::new("sealnote_reopen");
    let note_id = {
        let store = SqliteStore::open(&temp.path).expect("open should succeed");
        let (master, record) = vault().setup("integration pass").expect("setup should succeed");
        save_record(&store, &record).expect("save should succeed");
        NoteBook::new(&store, &master)
            .create("persisted note")
            .expect("create should succeed")
            .id
    };

    let store = SqliteStore::open(&temp.path).expect("reopen should succeed");
    let record = load_record(&store)
        .expect("load should succeed")
        .expect("record should exist");
    let master = vault()
        .unlock(&record, "integration pass")
        .expect("unlock should succeed");
    let note = NoteBook::new(&store, &master)
        .read(&note_id)
        .expect("read should succeed");
    assert_eq!(note.text, "persisted note");

    let raw = fs::read(&temp.path).expect("db file should be readable");
    assert!(!raw.windows(b"persisted note".len()).any(|w| w == b"persisted note"));
}

#[test]
fn test_wrong_passphrase_after_reopen() {
    let temp = TempFile::new("sealnote_wrong_pass");
    {
        let store = SqliteStore::open(&temp.path).expect("open should succeed");
        let (_, record) = vault().setup("integration pass").expect("setup should succeed");
        save_record(&store, &record).expect("save should succeed");
    }

    let store = SqliteStore::open(&temp.path).expect("reopen should succeed");
    let record = load_record(&store).unwrap().unwrap();
    let result = vault().unlock(&record, "not the passphrase");
    assert!(matches!(result, Err(SealnoteError::Authentication)));
}

#[test]
fn test_passphrase_change_keeps_notes_readable() {
    let store = SqliteStore::open_in_memory().expect("open should succeed");
    let (master, record) = vault().setup("first passphrase").unwrap();
    save_record(&store, &record).unwrap();
    let note = NoteBook::new(&store, &master).create("survives").unwrap();

    let new_record = vault()
        .change_passphrase(&record, "first passphrase", "second passphrase")
        .expect("change should succeed");
    save_record(&store, &new_record).unwrap();

    let record = load_record(&store).unwrap().unwrap();
    let master = vault().unlock(&record, "second passphrase").unwrap();
    assert_eq!(
        NoteBook::new(&store, &master).read(&note.id).unwrap().text,
        "survives"
    );
}

#[test]
fn test_backup_between_sqlite_stores() {
    let source_file = TempFile::new("sealnote_backup_source");
    let target_file = TempFile::new("sealnote_backup_target");
    let other_file = TempFile::new("sealnote_backup_other");

    let source = SqliteStore::open(&source_file.path).unwrap();
    let (master, record) = vault().setup("backup pass").unwrap();
    save_record(&source, &record).unwrap();
    let book = NoteBook::new(&source, &master);
    book.create("one").unwrap();
    book.create("two").unwrap();

    let json = export_backup(&source).unwrap().to_json_pretty().unwrap();
    let backup = Backup::from_json(&json).expect("backup should parse");

    // Fresh device: record installed, notes readable with the same passphrase.
    let target = SqliteStore::open(&target_file.path).unwrap();
    let summary = import_backup(&target, &backup).expect("import should succeed");
    assert!(summary.master_key_installed);
    assert_eq!(summary.notes_imported, 2);
    let installed = load_record(&target).unwrap().unwrap();
    let master = vault().unlock(&installed, "backup pass").unwrap();
    assert_eq!(NoteBook::new(&target, &master).list().unwrap().len(), 2);

    // Device with its own vault: refused.
    let other = SqliteStore::open(&other_file.path).unwrap();
    let (_, other_record) = vault().setup("backup pass").unwrap();
    save_record(&other, &other_record).unwrap();
    let err = import_backup(&other, &backup).unwrap_err();
    assert!(matches!(err, SealnoteError::BackupConflict(_)));
}
