//! Note body encryption.
//!
//! Thin policy layer over the AEAD: string plaintext, a nonce generated on
//! every call. There is intentionally no entry point that takes a nonce.

use crate::crypto::{self, MasterKey, NONCE_LENGTH};
use crate::error::{Result, SealnoteError};

/// Encrypted note body.
#[derive(Debug, Clone)]
pub struct EncryptedBody {
    pub ciphertext: Vec<u8>,
    pub iv: [u8; NONCE_LENGTH],
}

/// Encrypt `plaintext` under the master key with a fresh iv.
pub fn encrypt(plaintext: &str, master_key: &MasterKey) -> Result<EncryptedBody> {
    let sealed = crypto::seal(master_key.as_bytes(), plaintext.as_bytes())?;
    Ok(EncryptedBody {
        ciphertext: sealed.ciphertext,
        iv: sealed.nonce,
    })
}

/// Decrypt a note body.
///
/// # Errors
///
/// `SealnoteError::Integrity` for a wrong key, tampering, a malformed iv, or
/// a plaintext that is not UTF-8. Nothing is returned on failure.
pub fn decrypt(ciphertext: &[u8], iv: &[u8], master_key: &MasterKey) -> Result<String> {
    let plaintext = crypto::open(master_key.as_bytes(), iv, ciphertext)?;
    std::str::from_utf8(&plaintext)
        .map(str::to_owned)
        .map_err(|_| SealnoteError::Integrity)
}
