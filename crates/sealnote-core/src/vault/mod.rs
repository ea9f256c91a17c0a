//! Master key lifecycle.
//!
//! The master key is random and encrypts note bodies. It is stored only in
//! wrapped form: AES-256-GCM under a wrapping key derived from the user's
//! passphrase with PBKDF2. Unwrapping is the only passphrase check; there
//! is no separate verifier value that could be attacked offline more
//! cheaply than the AEAD itself.
//!
//! The free functions here are pure. [`KeyVault`] composes them into the
//! setup, unlock, and change-passphrase flows and produces
//! [`MasterKeyRecord`]s, which callers persist with [`save_record`].

mod record;

use zeroize::Zeroizing;

use crate::crypto::{
    self, derive_wrapping_key, derive_wrapping_key_async, random_array, validate_passphrase,
    MasterKey, WrappingKey, DEFAULT_ITERATIONS, KEY_LENGTH, MIN_ITERATIONS, MIN_SALT_LENGTH,
    NONCE_LENGTH,
};
use crate::error::{Result, SealnoteError};

pub use record::{load_record, save_record, MasterKeyRecord};

/// Output of [`wrap`].
#[derive(Debug, Clone)]
pub struct WrappedKey {
    pub wrapped_key: Vec<u8>,
    pub iv: [u8; NONCE_LENGTH],
}

/// Generate a fresh 256-bit master key.
pub fn generate_master_key() -> Result<MasterKey> {
    MasterKey::generate()
}

/// Encrypt the raw master key bytes under `wrapping_key` with a fresh iv.
pub fn wrap(master_key: &MasterKey, wrapping_key: &WrappingKey) -> Result<WrappedKey> {
    let sealed = crypto::seal(wrapping_key.as_bytes(), master_key.as_bytes())?;
    Ok(WrappedKey {
        wrapped_key: sealed.ciphertext,
        iv: sealed.nonce,
    })
}

/// Recover the master key.
///
/// # Errors
///
/// Every failure (wrong key, tampered ciphertext, malformed iv, unexpected
/// plaintext length) is `SealnoteError::Authentication`.
pub fn unwrap(wrapped_key: &[u8], wrapping_key: &WrappingKey, iv: &[u8]) -> Result<MasterKey> {
    let plaintext = crypto::open(wrapping_key.as_bytes(), iv, wrapped_key)
        .map_err(|_| SealnoteError::Authentication)?;
    let bytes: [u8; KEY_LENGTH] = plaintext
        .as_slice()
        .try_into()
        .map_err(|_| SealnoteError::Authentication)?;
    Ok(MasterKey::from_bytes(bytes))
}

/// Passphrase-driven vault flows.
#[derive(Debug, Clone, Copy)]
pub struct KeyVault {
    iterations: u32,
}

impl Default for KeyVault {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl KeyVault {
    /// Create a vault that derives new records with `iterations` rounds.
    pub fn new(iterations: u32) -> Result<Self> {
        if iterations < MIN_ITERATIONS {
            return Err(SealnoteError::Validation(format!(
                "Iteration count must be at least {} (got {})",
                MIN_ITERATIONS, iterations
            )));
        }
        Ok(Self { iterations })
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// First-run setup: new master key, new salt, wrapped under `passphrase`.
    pub fn setup(&self, passphrase: &str) -> Result<(MasterKey, MasterKeyRecord)> {
        validate_passphrase(passphrase)?;
        let master_key = generate_master_key()?;
        let record = self.seal_record(&master_key, passphrase)?;
        tracing::info!(iterations = self.iterations, "master key created");
        Ok((master_key, record))
    }

    /// Unwrap the master key from `record` with `passphrase`.
    pub fn unlock(&self, record: &MasterKeyRecord, passphrase: &str) -> Result<MasterKey> {
        let wrapping_key = derive_wrapping_key(passphrase, &record.salt, record.iterations)?;
        unwrap(&record.wrapped_key, &wrapping_key, &record.iv)
    }

    /// [`KeyVault::unlock`] with the key derivation on the blocking pool.
    pub async fn unlock_async(
        &self,
        record: &MasterKeyRecord,
        passphrase: Zeroizing<String>,
    ) -> Result<MasterKey> {
        let wrapping_key =
            derive_wrapping_key_async(passphrase, record.salt.clone(), record.iterations).await?;
        unwrap(&record.wrapped_key, &wrapping_key, &record.iv)
    }

    /// Re-wrap the same master key under `new_passphrase`.
    ///
    /// The returned record has a fresh salt and iv; notes stay valid because
    /// the master key does not change.
    pub fn change_passphrase(
        &self,
        record: &MasterKeyRecord,
        old_passphrase: &str,
        new_passphrase: &str,
    ) -> Result<MasterKeyRecord> {
        validate_passphrase(new_passphrase)?;
        let master_key = self.unlock(record, old_passphrase)?;
        let new_record = self.seal_record(&master_key, new_passphrase)?;
        tracing::info!("master key re-wrapped");
        Ok(new_record)
    }

    fn seal_record(&self, master_key: &MasterKey, passphrase: &str) -> Result<MasterKeyRecord> {
        let salt = random_array::<MIN_SALT_LENGTH>()?;
        let wrapping_key = derive_wrapping_key(passphrase, &salt, self.iterations)?;
        let wrapped = wrap(master_key, &wrapping_key)?;
        Ok(MasterKeyRecord {
            wrapped_key: wrapped.wrapped_key,
            salt: salt.to_vec(),
            iv: wrapped.iv.to_vec(),
            iterations: self.iterations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALT: &[u8] = b"0123456789abcdef";

    fn fast_vault() -> KeyVault {
        KeyVault::new(MIN_ITERATIONS).unwrap()
    }

    #[test]
    fn test_wrap_unwrap_round_trip() {
        let master = generate_master_key().unwrap();
        let wk = derive_wrapping_key("passphrase", SALT, MIN_ITERATIONS).unwrap();
        let wrapped = wrap(&master, &wk).unwrap();
        let recovered = unwrap(&wrapped.wrapped_key, &wk, &wrapped.iv).unwrap();
        assert_eq!(recovered.as_bytes(), master.as_bytes());
    }

    #[test]
    fn test_unwrap_with_wrong_key_is_authentication_error() {
        let master = generate_master_key().unwrap();
        let wk = derive_wrapping_key("passphrase", SALT, MIN_ITERATIONS).unwrap();
        let other = derive_wrapping_key("passphrasf", SALT, MIN_ITERATIONS).unwrap();
        let wrapped = wrap(&master, &wk).unwrap();

        let err = unwrap(&wrapped.wrapped_key, &other, &wrapped.iv).unwrap_err();
        assert!(matches!(err, SealnoteError::Authentication));
        assert_eq!(err.to_string(), "Incorrect passphrase");
    }

    #[test]
    fn test_unwrap_malformed_inputs_are_authentication_errors() {
        let master = generate_master_key().unwrap();
        let wk = derive_wrapping_key("passphrase", SALT, MIN_ITERATIONS).unwrap();
        let wrapped = wrap(&master, &wk).unwrap();

        assert!(matches!(
            unwrap(&wrapped.wrapped_key, &wk, &wrapped.iv[..8]),
            Err(SealnoteError::Authentication)
        ));

        let mut tampered = wrapped.wrapped_key.clone();
        tampered[0] ^= 0x01;
        assert!(matches!(
            unwrap(&tampered, &wk, &wrapped.iv),
            Err(SealnoteError::Authentication)
        ));

        // A valid AEAD payload of the wrong length is still rejected.
        let short = crypto::seal(wk.as_bytes(), &[0u8; 16]).unwrap();
        assert!(matches!(
            unwrap(&short.ciphertext, &wk, &short.nonce),
            Err(SealnoteError::Authentication)
        ));
    }

    #[test]
    fn test_wrap_uses_fresh_iv() {
        let master = generate_master_key().unwrap();
        let wk = derive_wrapping_key("passphrase", SALT, MIN_ITERATIONS).unwrap();
        let a = wrap(&master, &wk).unwrap();
        let b = wrap(&master, &wk).unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.wrapped_key, b.wrapped_key);
    }

    #[test]
    fn test_generate_master_key_is_random() {
        let a = generate_master_key().unwrap();
        let b = generate_master_key().unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_new_rejects_low_iterations() {
        assert!(matches!(
            KeyVault::new(MIN_ITERATIONS - 1),
            Err(SealnoteError::Validation(_))
        ));
        assert_eq!(KeyVault::default().iterations(), DEFAULT_ITERATIONS);
    }

    #[test]
    fn test_setup_and_unlock() {
        let vault = fast_vault();
        let (master, record) = vault.setup("correct horse").unwrap();
        assert_eq!(record.salt.len(), MIN_SALT_LENGTH);
        assert_eq!(record.iv.len(), NONCE_LENGTH);
        assert_eq!(record.iterations, MIN_ITERATIONS);
        record.validate().unwrap();

        let unlocked = vault.unlock(&record, "correct horse").unwrap();
        assert_eq!(unlocked.as_bytes(), master.as_bytes());

        assert!(matches!(
            vault.unlock(&record, "wrong horse"),
            Err(SealnoteError::Authentication)
        ));
    }

    #[test]
    fn test_setup_rejects_weak_passphrase() {
        assert!(matches!(
            fast_vault().setup("short"),
            Err(SealnoteError::Validation(_))
        ));
    }

    #[test]
    fn test_setups_use_distinct_salts() {
        let vault = fast_vault();
        let (_, a) = vault.setup("passphrase one").unwrap();
        let (_, b) = vault.setup("passphrase one").unwrap();
        assert!(!a.same_lineage(&b));
    }

    #[test]
    fn test_change_passphrase_keeps_master_key() {
        let vault = fast_vault();
        let (master, record) = vault.setup("old passphrase").unwrap();
        let new_record = vault
            .change_passphrase(&record, "old passphrase", "new passphrase")
            .unwrap();

        assert_ne!(new_record.salt, record.salt);
        assert_ne!(new_record.iv, record.iv);

        let unlocked = vault.unlock(&new_record, "new passphrase").unwrap();
        assert_eq!(unlocked.as_bytes(), master.as_bytes());
        assert!(matches!(
            vault.unlock(&new_record, "old passphrase"),
            Err(SealnoteError::Authentication)
        ));
    }

    #[test]
    fn test_change_passphrase_requires_old() {
        let vault = fast_vault();
        let (_, record) = vault.setup("old passphrase").unwrap();
        assert!(matches!(
            vault.change_passphrase(&record, "not the old one", "new passphrase"),
            Err(SealnoteError::Authentication)
        ));
    }

    #[tokio::test]
    async fn test_unlock_async_matches_sync() {
        let vault = fast_vault();
        let (master, record) = vault.setup("async passphrase").unwrap();
        let unlocked = vault
            .unlock_async(&record, Zeroizing::new("async passphrase".to_string()))
            .await
            .unwrap();
        assert_eq!(unlocked.as_bytes(), master.as_bytes());
    }
}
