//! Persisted form of the wrapped master key.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::crypto::{MIN_ITERATIONS, MIN_SALT_LENGTH, NONCE_LENGTH, TAG_LENGTH, KEY_LENGTH};
use crate::encoding::b64;
use crate::error::{Result, SealnoteError};
use crate::storage::{KeyValueStore, KeyValueStoreExt, MASTER_KEY_KEY, META_TABLE};

const LINEAGE_ID_BYTES: usize = 6;

/// Wrapped master key plus everything needed to re-derive the wrapping key.
///
/// Salts identify a key lineage: two records with different salts were
/// produced by different setups and protect different master keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterKeyRecord {
    #[serde(with = "b64")]
    pub wrapped_key: Vec<u8>,
    #[serde(with = "b64")]
    pub salt: Vec<u8>,
    #[serde(with = "b64")]
    pub iv: Vec<u8>,
    pub iterations: u32,
}

impl MasterKeyRecord {
    /// Structural checks for records arriving from outside (backups).
    pub fn validate(&self) -> Result<()> {
        if self.salt.len() < MIN_SALT_LENGTH {
            return Err(SealnoteError::Validation(format!(
                "Master key salt must be at least {} bytes",
                MIN_SALT_LENGTH
            )));
        }
        if self.iv.len() != NONCE_LENGTH {
            return Err(SealnoteError::Validation(format!(
                "Master key iv must be {} bytes",
                NONCE_LENGTH
            )));
        }
        if self.iterations < MIN_ITERATIONS {
            return Err(SealnoteError::Validation(format!(
                "Master key iterations must be at least {}",
                MIN_ITERATIONS
            )));
        }
        if self.wrapped_key.len() != KEY_LENGTH + TAG_LENGTH {
            return Err(SealnoteError::Validation(
                "Wrapped master key has an unexpected length".to_string(),
            ));
        }
        Ok(())
    }

    /// Short, non-secret identifier of this record's lineage.
    pub fn lineage_id(&self) -> String {
        Sha256::digest(&self.salt)[..LINEAGE_ID_BYTES]
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }

    /// Whether `other` was produced by the same setup.
    pub fn same_lineage(&self, other: &MasterKeyRecord) -> bool {
        self.salt == other.salt
    }
}

/// Read the master key record, if the vault has been set up.
pub fn load_record<S: KeyValueStore + ?Sized>(store: &S) -> Result<Option<MasterKeyRecord>> {
    store.get_record(META_TABLE, MASTER_KEY_KEY)
}

/// Replace the master key record.
pub fn save_record<S: KeyValueStore + ?Sized>(store: &S, record: &MasterKeyRecord) -> Result<()> {
    store.put_record(META_TABLE, MASTER_KEY_KEY, record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn sample() -> MasterKeyRecord {
        MasterKeyRecord {
            wrapped_key: vec![7; KEY_LENGTH + TAG_LENGTH],
            salt: vec![1; 16],
            iv: vec![2; 12],
            iterations: 200_000,
        }
    }

    #[test]
    fn test_camel_case_json() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("wrappedKey").is_some());
        assert_eq!(json["iterations"], 200_000);
        assert_eq!(json["salt"], "AQEBAQEBAQEBAQEBAQEBAQ==");
    }

    #[test]
    fn test_validate() {
        assert!(sample().validate().is_ok());

        let mut short_salt = sample();
        short_salt.salt = vec![1; 8];
        assert!(short_salt.validate().is_err());

        let mut bad_iv = sample();
        bad_iv.iv = vec![0; 16];
        assert!(bad_iv.validate().is_err());

        let mut weak = sample();
        weak.iterations = 1_000;
        assert!(weak.validate().is_err());
    }

    #[test]
    fn test_load_save() {
        let store = MemoryStore::new();
        assert!(load_record(&store).unwrap().is_none());
        save_record(&store, &sample()).unwrap();
        assert_eq!(load_record(&store).unwrap(), Some(sample()));
    }

    #[test]
    fn test_lineage() {
        let a = sample();
        let mut b = sample();
        assert!(a.same_lineage(&b));
        b.salt = vec![9; 16];
        assert!(!a.same_lineage(&b));
        assert_eq!(a.lineage_id().len(), 12);
        assert_ne!(a.lineage_id(), b.lineage_id());
    }
}
