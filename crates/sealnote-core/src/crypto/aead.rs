//! AES-256-GCM authenticated encryption.
//!
//! [`seal`] always draws its own nonce from OS entropy. There is no
//! function that encrypts under a caller-supplied nonce, so nonce reuse
//! under one key cannot be expressed through this API.
//!
//! The ciphertext returned by [`seal`] carries the 16-byte GCM tag at its
//! end; [`open`] expects the same layout.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use zeroize::Zeroizing;

use crate::crypto::key::KEY_LENGTH;
use crate::crypto::random::random_array;
use crate::error::{Result, SealnoteError};

/// Nonce size in bytes (96-bit GCM nonce).
pub const NONCE_LENGTH: usize = 12;

/// GCM authentication tag size in bytes.
pub const TAG_LENGTH: usize = 16;

/// Output of a single [`seal`] call.
#[derive(Debug, Clone)]
pub struct Sealed {
    /// Ciphertext with the authentication tag appended
    pub ciphertext: Vec<u8>,

    /// The nonce generated for this call
    pub nonce: [u8; NONCE_LENGTH],
}

/// Encrypt and authenticate `plaintext` under `key` with a fresh nonce.
pub fn seal(key: &[u8; KEY_LENGTH], plaintext: &[u8]) -> Result<Sealed> {
    let nonce = random_array::<NONCE_LENGTH>()?;
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| SealnoteError::Crypto("Invalid key length".to_string()))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| SealnoteError::Crypto("Encryption failed".to_string()))?;

    Ok(Sealed { ciphertext, nonce })
}

/// Authenticate and decrypt `ciphertext`.
///
/// # Errors
///
/// Returns `SealnoteError::Integrity` when the nonce has the wrong length,
/// the ciphertext is shorter than a tag, or the tag does not verify (wrong
/// key or tampered data). No plaintext is returned on failure.
pub fn open(
    key: &[u8; KEY_LENGTH],
    nonce: &[u8],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    if nonce.len() != NONCE_LENGTH || ciphertext.len() < TAG_LENGTH {
        return Err(SealnoteError::Integrity);
    }

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| SealnoteError::Crypto("Invalid key length".to_string()))?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| SealnoteError::Integrity)?;

    Ok(Zeroizing::new(plaintext))
}
