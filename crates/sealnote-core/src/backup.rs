//! Backup export and import.
//!
//! A backup is a single JSON document:
//!
//! ```json
//! { "version": 1, "masterKeyData": { ... } | null, "notes": [ ... ], "exportedAt": 1700000000000 }
//! ```
//!
//! Everything in it is already encrypted, so the file is as safe as the
//! passphrase. Import refuses to mix notes from a different key lineage
//! (a different setup salt) into the local vault.

use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SealnoteError};
use crate::notes::Note;
use crate::storage::{KeyValueStore, KeyValueStoreExt, NOTES_INDEX, NOTES_TABLE};
use crate::vault::{load_record, save_record, MasterKeyRecord};

/// The only backup format version this build reads and writes.
pub const BACKUP_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub version: u32,
    pub master_key_data: Option<MasterKeyRecord>,
    pub notes: Vec<Note>,
    /// Unix milliseconds
    pub exported_at: i64,
}

/// What an import changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub notes_imported: usize,
    pub master_key_installed: bool,
}

impl Backup {
    /// Parse a backup, checking the version before anything else.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| SealnoteError::Validation(format!("Backup is not valid JSON: {}", e)))?;
        let version = value
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| SealnoteError::Validation("Backup has no version".to_string()))?;
        if version != u64::from(BACKUP_VERSION) {
            return Err(SealnoteError::Validation(format!(
                "Unsupported backup version: {}",
                version
            )));
        }
        serde_json::from_value(value)
            .map_err(|e| SealnoteError::Validation(format!("Malformed backup: {}", e)))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn read_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write atomically with owner-only permissions.
    pub fn write_file(&self, path: &Path) -> Result<()> {
        crate::fs::write_atomic(path, self.to_json_pretty()?.as_bytes())?;
        Ok(())
    }
}

/// Snapshot the vault record and all notes.
pub fn export_backup<S: KeyValueStore + ?Sized>(store: &S) -> Result<Backup> {
    let backup = Backup {
        version: BACKUP_VERSION,
        master_key_data: load_record(store)?,
        notes: store.list_records(NOTES_TABLE, NOTES_INDEX)?,
        exported_at: Utc::now().timestamp_millis(),
    };
    tracing::info!(notes = backup.notes.len(), "backup exported");
    Ok(backup)
}

/// Merge a backup into the local store.
///
/// - No local record: the backup's record is installed.
/// - Local record with a different salt: `BackupConflict`, nothing written.
/// - Notes are upserted by id.
///
/// A backup with notes but no record is refused, since nothing ties its
/// notes to the local key.
pub fn import_backup<S: KeyValueStore + ?Sized>(store: &S, backup: &Backup) -> Result<ImportSummary> {
    if backup.version != BACKUP_VERSION {
        return Err(SealnoteError::Validation(format!(
            "Unsupported backup version: {}",
            backup.version
        )));
    }
    if let Some(record) = &backup.master_key_data {
        record.validate()?;
    }
    for note in &backup.notes {
        note.validate()?;
    }

    let local = load_record(store)?;
    let install = match (&local, &backup.master_key_data) {
        (Some(local), Some(incoming)) if !local.same_lineage(incoming) => {
            return Err(SealnoteError::BackupConflict(format!(
                "backup key lineage {} differs from local vault lineage {}; \
                 its notes were encrypted under a different master key",
                incoming.lineage_id(),
                local.lineage_id()
            )));
        }
        (_, None) if !backup.notes.is_empty() => {
            return Err(SealnoteError::BackupConflict(
                "backup contains notes but no master key record".to_string(),
            ));
        }
        (None, Some(incoming)) => Some(incoming),
        _ => None,
    };

    if let Some(record) = install {
        save_record(store, record)?;
    }
    for note in &backup.notes {
        store.put_record(NOTES_TABLE, &note.id.to_string(), note)?;
    }

    let summary = ImportSummary {
        notes_imported: backup.notes.len(),
        master_key_installed: install.is_some(),
    };
    tracing::info!(
        notes = summary.notes_imported,
        installed = summary.master_key_installed,
        "backup imported"
    );
    Ok(summary)
}
