//! Key-value store trait definition.
//!
//! The `KeyValueStore` trait is the only persistence interface the core
//! depends on. Everything written through it is already encrypted or is
//! non-confidential metadata (ids, timestamps, salts, public keys).

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Abstract persistent key-value store, partitioned into named tables.
///
/// All implementations must ensure:
/// - `put` replaces any existing value under the same `(table, key)`
/// - `get` of a missing key is `Ok(None)`, never an error
/// - Writes are atomic per value
pub trait KeyValueStore: Send + Sync {
    /// Insert or replace a value.
    fn put(&self, table: &str, key: &str, value: &Value) -> Result<()>;

    /// Fetch a value.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(value))` if found, `Ok(None)` if not found.
    fn get(&self, table: &str, key: &str) -> Result<Option<Value>>;

    /// Remove a value.
    ///
    /// # Returns
    ///
    /// Returns `true` if a value was removed.
    fn delete(&self, table: &str, key: &str) -> Result<bool>;

    /// List a table ordered ascending by the top-level field `index`.
    ///
    /// Values that lack the field, or hold `null` there, are not part of the
    /// index and are omitted.
    /// Numbers order numerically, strings lexicographically.
    ///
    /// # Errors
    ///
    /// Returns `SealnoteError::Validation` if `index` is not a plain
    /// identifier (`[A-Za-z0-9_]+`).
    fn list_by_index(&self, table: &str, index: &str) -> Result<Vec<Value>>;

    /// Read-modify-write a single value with no other write in between.
    ///
    /// `apply` receives the current value and returns the replacement, or
    /// `None` to leave the value untouched. An error from `apply` aborts
    /// the update and is returned as is.
    ///
    /// # Returns
    ///
    /// The value stored after the call.
    fn update(
        &self,
        table: &str,
        key: &str,
        apply: &mut dyn FnMut(Option<Value>) -> Result<Option<Value>>,
    ) -> Result<Option<Value>>;
}

/// Typed convenience layer over [`KeyValueStore`].
pub trait KeyValueStoreExt: KeyValueStore {
    /// Serialize and store a record.
    fn put_record<T: Serialize>(&self, table: &str, key: &str, record: &T) -> Result<()> {
        let value = serde_json::to_value(record)?;
        self.put(table, key, &value)
    }

    /// Fetch and deserialize a record.
    fn get_record<T: DeserializeOwned>(&self, table: &str, key: &str) -> Result<Option<T>> {
        match self.get(table, key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// List and deserialize records ordered by `index`.
    fn list_records<T: DeserializeOwned>(&self, table: &str, index: &str) -> Result<Vec<T>> {
        self.list_by_index(table, index)?
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(Into::into))
            .collect()
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}

/// Reject index names that are not plain identifiers.
pub(crate) fn validate_index_name(index: &str) -> Result<()> {
    if index.is_empty() || !index.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(crate::error::SealnoteError::Validation(format!(
            "Invalid index name: {:?}",
            index
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_is_object_safe() {
        fn _accepts_dyn(_store: &dyn KeyValueStore) {}
    }

    #[test]
    fn test_index_name_validation() {
        assert!(validate_index_name("updatedAt").is_ok());
        assert!(validate_index_name("created_at").is_ok());
        assert!(validate_index_name("").is_err());
        assert!(validate_index_name("a.b").is_err());
        assert!(validate_index_name("x') OR 1=1 --").is_err());
    }
}
