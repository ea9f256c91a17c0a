//! SQLite-backed store.
//!
//! One table holds every logical table as `(tbl, key) -> JSON text`. Index
//! listing uses SQLite's built-in JSON functions, so no per-table schema is
//! needed when new record kinds are added.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde_json::Value;

use super::traits::{validate_index_name, KeyValueStore};
use crate::error::{Result, SealnoteError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    tbl TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (tbl, key)
);
"#;

/// Durable [`KeyValueStore`] in a single SQLite file.
pub struct SqliteStore {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if needed) a store file. New files are created with
    /// owner-only permissions on Unix.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            create_private_file(path)?;
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA)?;
        tracing::debug!(path = %path.display(), "opened sqlite store");
        Ok(Self {
            path: Some(path.to_path_buf()),
            conn: Mutex::new(conn),
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            path: None,
            conn: Mutex::new(conn),
        })
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| SealnoteError::Storage("SQLite connection poisoned".to_string()))
    }
}

fn create_private_file(path: &Path) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
        .open(path)
        .map_err(|e| SealnoteError::Storage(format!("Store file create failed: {}", e)))?;
    Ok(())
}

fn parse_value(text: &str) -> Result<Value> {
    serde_json::from_str(text)
        .map_err(|e| SealnoteError::Storage(format!("Corrupt stored value: {}", e)))
}

impl KeyValueStore for SqliteStore {
    fn put(&self, table: &str, key: &str, value: &Value) -> Result<()> {
        let text = serde_json::to_string(value)?;
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO kv (tbl, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT (tbl, key) DO UPDATE SET value = excluded.value",
            params![table, key, text],
        )?;
        Ok(())
    }

    fn get(&self, table: &str, key: &str) -> Result<Option<Value>> {
        let conn = self.lock_conn()?;
        let text: Option<String> = conn
            .query_row(
                "SELECT value FROM kv WHERE tbl = ?1 AND key = ?2",
                params![table, key],
                |row| row.get(0),
            )
            .optional()?;
        text.as_deref().map(parse_value).transpose()
    }

    fn delete(&self, table: &str, key: &str) -> Result<bool> {
        let conn = self.lock_conn()?;
        let removed = conn.execute(
            "DELETE FROM kv WHERE tbl = ?1 AND key = ?2",
            params![table, key],
        )?;
        Ok(removed > 0)
    }

    fn update(
        &self,
        table: &str,
        key: &str,
        apply: &mut dyn FnMut(Option<Value>) -> Result<Option<Value>>,
    ) -> Result<Option<Value>> {
        let mut conn = self.lock_conn()?;
        // IMMEDIATE takes the write lock up front, so other connections to
        // the same file cannot interleave between the read and the write.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let text: Option<String> = tx
            .query_row(
                "SELECT value FROM kv WHERE tbl = ?1 AND key = ?2",
                params![table, key],
                |row| row.get(0),
            )
            .optional()?;
        let current = text.as_deref().map(parse_value).transpose()?;

        let stored = match apply(current.clone())? {
            Some(next) => {
                tx.execute(
                    "INSERT INTO kv (tbl, key, value) VALUES (?1, ?2, ?3)
                     ON CONFLICT (tbl, key) DO UPDATE SET value = excluded.value",
                    params![table, key, serde_json::to_string(&next)?],
                )?;
                Some(next)
            }
            None => current,
        };
        tx.commit()?;
        Ok(stored)
    }

    fn list_by_index(&self, table: &str, index: &str) -> Result<Vec<Value>> {
        validate_index_name(index)?;
        let json_path = format!("$.{}", index);
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT value FROM kv
             WHERE tbl = ?1 AND json_extract(value, ?2) IS NOT NULL
             ORDER BY json_extract(value, ?2) ASC, key ASC",
        )?;
        let rows = stmt.query_map(params![table, json_path], |row| row.get::<_, String>(0))?;

        let mut values = Vec::new();
        for row in rows {
            values.push(parse_value(&row?)?);
        }
        Ok(values)
    }
}
