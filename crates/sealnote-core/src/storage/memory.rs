//! In-memory store, used by tests and ephemeral sessions.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use super::traits::{validate_index_name, KeyValueStore};
use crate::error::{Result, SealnoteError};

type Tables = HashMap<String, BTreeMap<String, Value>>;

/// Volatile [`KeyValueStore`] backed by a map per table.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| SealnoteError::Storage("Memory store poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn put(&self, table: &str, key: &str, value: &Value) -> Result<()> {
        let mut tables = self.lock_tables()?;
        tables
            .entry(table.to_string())
            .or_default()
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    fn get(&self, table: &str, key: &str) -> Result<Option<Value>> {
        let tables = self.lock_tables()?;
        Ok(tables.get(table).and_then(|rows| rows.get(key)).cloned())
    }

    fn delete(&self, table: &str, key: &str) -> Result<bool> {
        let mut tables = self.lock_tables()?;
        Ok(tables
            .get_mut(table)
            .map(|rows| rows.remove(key).is_some())
            .unwrap_or(false))
    }

    fn update(
        &self,
        table: &str,
        key: &str,
        apply: &mut dyn FnMut(Option<Value>) -> Result<Option<Value>>,
    ) -> Result<Option<Value>> {
        let mut tables = self.lock_tables()?;
        let current = tables.get(table).and_then(|rows| rows.get(key)).cloned();
        match apply(current.clone())? {
            Some(next) => {
                tables
                    .entry(table.to_string())
                    .or_default()
                    .insert(key.to_string(), next.clone());
                Ok(Some(next))
            }
            None => Ok(current),
        }
    }

    fn list_by_index(&self, table: &str, index: &str) -> Result<Vec<Value>> {
        validate_index_name(index)?;
        let tables = self.lock_tables()?;
        let Some(rows) = tables.get(table) else {
            return Ok(Vec::new());
        };

        let mut indexed: Vec<(&Value, &Value)> = rows
            .values()
            .filter_map(|value| value.get(index).map(|field| (field, value)))
            .filter(|(field, _)| !field.is_null())
            .collect();
        // Stable sort keeps key order for equal index values.
        indexed.sort_by(|(a, _), (b, _)| compare_index(a, b));
        Ok(indexed.into_iter().map(|(_, value)| value.clone()).collect())
    }
}

/// Order index fields: numbers numerically, strings lexicographically,
/// numbers before strings. Other JSON types sort last.
pub(crate) fn compare_index(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Number(_), _) => Ordering::Less,
        (_, Value::Number(_)) => Ordering::Greater,
        (Value::String(_), _) => Ordering::Less,
        (_, Value::String(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_get_delete() {
        let store = MemoryStore::new();
        store.put("notes", "a", &json!({"x": 1})).unwrap();
        assert_eq!(store.get("notes", "a").unwrap(), Some(json!({"x": 1})));
        assert_eq!(store.get("notes", "b").unwrap(), None);
        assert_eq!(store.get("other", "a").unwrap(), None);

        assert!(store.delete("notes", "a").unwrap());
        assert!(!store.delete("notes", "a").unwrap());
        assert_eq!(store.get("notes", "a").unwrap(), None);
    }

    #[test]
    fn test_put_replaces() {
        let store = MemoryStore::new();
        store.put("t", "k", &json!(1)).unwrap();
        store.put("t", "k", &json!(2)).unwrap();
        assert_eq!(store.get("t", "k").unwrap(), Some(json!(2)));
    }

    #[test]
    fn test_update_in_place() {
        let store = MemoryStore::new();
        store.put("t", "k", &json!(1)).unwrap();

        let after = store
            .update("t", "k", &mut |current| {
                Ok(current.and_then(|v| v.as_i64()).map(|n| json!(n + 1)))
            })
            .unwrap();
        assert_eq!(after, Some(json!(2)));

        let unchanged = store.update("t", "k", &mut |_| Ok(None)).unwrap();
        assert_eq!(unchanged, Some(json!(2)));

        let failed = store.update("t", "k", &mut |_| {
            Err(SealnoteError::Conflict("no".to_string()))
        });
        assert!(matches!(failed, Err(SealnoteError::Conflict(_))));
        assert_eq!(store.get("t", "k").unwrap(), Some(json!(2)));
    }

    #[test]
    fn test_list_by_index_orders_and_filters() {
        let store = MemoryStore::new();
        store.put("notes", "a", &json!({"updatedAt": 30})).unwrap();
        store.put("notes", "b", &json!({"updatedAt": 10})).unwrap();
        store.put("notes", "c", &json!({"other": 5})).unwrap();
        store.put("notes", "e", &json!({"updatedAt": null})).unwrap();
        store.put("notes", "d", &json!({"updatedAt": 20})).unwrap();

        let listed = store.list_by_index("notes", "updatedAt").unwrap();
        let order: Vec<i64> = listed
            .iter()
            .map(|v| v["updatedAt"].as_i64().unwrap())
            .collect();
        assert_eq!(order, vec![10, 20, 30]);
    }

    #[test]
    fn test_list_empty_table() {
        let store = MemoryStore::new();
        assert!(store.list_by_index("missing", "updatedAt").unwrap().is_empty());
    }

    #[test]
    fn test_list_rejects_bad_index() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.list_by_index("notes", "a-b"),
            Err(SealnoteError::Validation(_))
        ));
    }

    #[test]
    fn test_compare_index_mixed_types() {
        assert_eq!(compare_index(&json!(1), &json!("a")), Ordering::Less);
        assert_eq!(compare_index(&json!("b"), &json!("a")), Ordering::Greater);
        assert_eq!(compare_index(&json!(2.5), &json!(2)), Ordering::Greater);
    }
}
