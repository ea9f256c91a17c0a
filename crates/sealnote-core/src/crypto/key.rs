//! Symmetric key types.
//!
//! Two distinct newtypes keep the roles apart at compile time: a
//! [`WrappingKey`] can only wrap and unwrap, a [`MasterKey`] encrypts notes.
//! Both are zeroized on drop and redact themselves in `Debug` output.

use zeroize::ZeroizeOnDrop;

use crate::crypto::random::random_array;
use crate::error::Result;

/// Length of every symmetric key in bytes (256-bit).
pub const KEY_LENGTH: usize = 32;

/// The random key that encrypts note bodies.
///
/// Generated once at setup and never derived from the passphrase.
#[derive(Clone, ZeroizeOnDrop)]
pub struct MasterKey {
    key: [u8; KEY_LENGTH],
}

impl MasterKey {
    /// Generate a fresh master key from OS entropy.
    pub fn generate() -> Result<Self> {
        Ok(Self {
            key: random_array::<KEY_LENGTH>()?,
        })
    }

    pub(crate) fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// A passphrase-derived key used only to wrap the master key.
#[derive(ZeroizeOnDrop)]
pub struct WrappingKey {
    key: [u8; KEY_LENGTH],
}

impl WrappingKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for WrappingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WrappingKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_keys_differ() {
        let a = MasterKey::generate().unwrap();
        let b = MasterKey::generate().unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
        assert_eq!(a.as_bytes().len(), KEY_LENGTH);
    }

    #[test]
    fn test_master_key_debug_redacts() {
        let key = MasterKey::from_bytes([0xAB; KEY_LENGTH]);
        let debug_output = format!("{:?}", key);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains(&hex::encode(&key.as_bytes()[..4])));
    }

    #[test]
    fn test_wrapping_key_debug_redacts() {
        let key = WrappingKey::from_bytes([0x5A; KEY_LENGTH]);
        let debug_output = format!("{:?}", key);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("5a5a5a5a"));
    }
}
