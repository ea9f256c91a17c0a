//! Registered credentials.

use chrono::Utc;

use super::registration::AttestedCredential;
use super::types::Credential;
use crate::error::{Result, SealnoteError};
use crate::storage::{KeyValueStore, KeyValueStoreExt, CREDENTIALS_INDEX, CREDENTIALS_TABLE};

/// Credential bookkeeping over a key-value store.
pub struct CredentialRegistry<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: KeyValueStore + ?Sized> CredentialRegistry<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Store a newly attested credential.
    ///
    /// # Errors
    ///
    /// `SealnoteError::Conflict` if the credential id is already registered.
    pub fn register(&self, attested: &AttestedCredential) -> Result<Credential> {
        if self.find(&attested.credential_id)?.is_some() {
            return Err(SealnoteError::Conflict(format!(
                "credential {} is already registered",
                attested.credential_id
            )));
        }
        let credential = Credential {
            id: attested.credential_id.clone(),
            public_key: attested.public_key.clone(),
            counter: attested.sign_count,
            created_at: Utc::now().timestamp_millis(),
        };
        self.store
            .put_record(CREDENTIALS_TABLE, &credential.id, &credential)?;
        tracing::info!(credential_id = %credential.id, "credential registered");
        Ok(credential)
    }

    pub fn find(&self, id: &str) -> Result<Option<Credential>> {
        self.store.get_record(CREDENTIALS_TABLE, id)
    }

    pub fn get(&self, id: &str) -> Result<Credential> {
        self.find(id)?
            .ok_or_else(|| SealnoteError::NotFound(format!("credential {}", id)))
    }

    /// All credentials, oldest first.
    pub fn list(&self) -> Result<Vec<Credential>> {
        self.store.list_records(CREDENTIALS_TABLE, CREDENTIALS_INDEX)
    }

    pub fn remove(&self, id: &str) -> Result<()> {
        if !self.store.delete(CREDENTIALS_TABLE, id)? {
            return Err(SealnoteError::NotFound(format!("credential {}", id)));
        }
        tracing::info!(credential_id = %id, "credential removed");
        Ok(())
    }

    /// Accept a verified assertion's signature counter.
    ///
    /// The counter must strictly increase. Authenticators that do not
    /// implement counters always report zero; a zero stored counter paired
    /// with a zero reported counter is accepted.
    ///
    /// # Errors
    ///
    /// `SealnoteError::Conflict` when the counter did not increase, which
    /// indicates a replayed assertion or a cloned authenticator.
    pub fn record_assertion_counter(&self, id: &str, counter: u32) -> Result<Credential> {
        let stored = self.store.update(CREDENTIALS_TABLE, id, &mut |current| {
            let Some(value) = current else {
                return Err(SealnoteError::NotFound(format!("credential {}", id)));
            };
            let mut credential: Credential = serde_json::from_value(value)?;
            if counter == 0 && credential.counter == 0 {
                return Ok(None);
            }
            if counter <= credential.counter {
                tracing::warn!(
                    credential_id = %id,
                    stored = credential.counter,
                    reported = counter,
                    "signature counter did not increase"
                );
                return Err(SealnoteError::Conflict(
                    "Signature counter did not increase".to_string(),
                ));
            }
            credential.counter = counter;
            Ok(Some(serde_json::to_value(&credential)?))
        })?;
        let value =
            stored.ok_or_else(|| SealnoteError::NotFound(format!("credential {}", id)))?;
        Ok(serde_json::from_value(value)?)
    }
}
