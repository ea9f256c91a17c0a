//! Wrapping-key derivation using PBKDF2-HMAC-SHA256.
//!
//! The derived key is only ever used to wrap the random master key, so the
//! KDF cost is paid once per unlock rather than once per note.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::crypto::key::{WrappingKey, KEY_LENGTH};
use crate::error::{Result, SealnoteError};

/// Lowest iteration count accepted when deriving or reading a record.
pub const MIN_ITERATIONS: u32 = 100_000;

/// Iteration count used for new records (roughly 100-300ms on a laptop).
pub const DEFAULT_ITERATIONS: u32 = 200_000;

/// Minimum salt length in bytes.
pub const MIN_SALT_LENGTH: usize = 16;

/// Derive a wrapping key from a passphrase.
///
/// # Arguments
///
/// * `passphrase` - The user's passphrase
/// * `salt` - Random salt stored alongside the wrapped key
/// * `iterations` - PBKDF2 round count, at least [`MIN_ITERATIONS`]
///
/// # Security
///
/// - Same passphrase + salt + iterations always produces the same key
/// - Changing any input produces an unrelated key
/// - CPU-heavy on purpose: call [`derive_wrapping_key_async`] from async code
///
/// # Examples
///
/// ```
/// use sealnote_core::crypto::derive_wrapping_key;
///
/// let salt = b"unique-salt-per-vault";
/// let key = derive_wrapping_key("my-passphrase", salt, 100_000).unwrap();
/// assert_eq!(key.as_bytes().len(), 32);
/// ```
pub fn derive_wrapping_key(passphrase: &str, salt: &[u8], iterations: u32) -> Result<WrappingKey> {
    if passphrase.is_empty() {
        return Err(SealnoteError::Validation(
            "Passphrase cannot be empty".to_string(),
        ));
    }

    if salt.len() < MIN_SALT_LENGTH {
        return Err(SealnoteError::Validation(format!(
            "Salt must be at least {} bytes",
            MIN_SALT_LENGTH
        )));
    }

    if iterations < MIN_ITERATIONS {
        return Err(SealnoteError::Validation(format!(
            "Iteration count must be at least {} (got {})",
            MIN_ITERATIONS, iterations
        )));
    }

    let mut key_bytes = [0u8; KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, iterations, &mut key_bytes);

    Ok(WrappingKey::from_bytes(key_bytes))
}

/// Run [`derive_wrapping_key`] on the blocking thread pool.
///
/// Keeps a 200k-round derivation off async worker threads.
pub async fn derive_wrapping_key_async(
    passphrase: Zeroizing<String>,
    salt: Vec<u8>,
    iterations: u32,
) -> Result<WrappingKey> {
    tokio::task::spawn_blocking(move || derive_wrapping_key(&passphrase, &salt, iterations))
        .await
        .map_err(|e| SealnoteError::Other(format!("Key derivation task failed: {}", e)))?
}
