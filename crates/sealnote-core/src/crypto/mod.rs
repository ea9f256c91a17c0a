//! Cryptographic primitives for Sealnote.
//!
//! This module provides the leaves every other component is built on:
//! - **AES-256-GCM**: authenticated encryption with a fresh 96-bit nonce per seal
//! - **PBKDF2-HMAC-SHA256**: passphrase to wrapping-key derivation
//! - **OS entropy**: key, salt, nonce and challenge generation
//!
//! ## Security Model
//!
//! - The master key is random; the passphrase only ever derives a wrapping key
//! - Unwrap failure is the sole passphrase check (no separate verifier hash)
//! - Nonces are generated inside [`aead::seal`]; no API accepts one
//! - Key material is zeroized from memory on drop
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the persisted store (wrapped key, note ciphertexts)
//! - Tampering with persisted ciphertexts
//! - Offline brute force beyond the cost of the KDF
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Access to an unlocked session / process memory
//! - A forgotten passphrase (there is no recovery path)

pub mod aead;
pub mod kdf;
pub mod key;
pub mod passphrase;
pub mod random;

pub use aead::{open, seal, Sealed, NONCE_LENGTH, TAG_LENGTH};
pub use kdf::{
    derive_wrapping_key, derive_wrapping_key_async, DEFAULT_ITERATIONS, MIN_ITERATIONS,
    MIN_SALT_LENGTH,
};
pub use key::{MasterKey, WrappingKey, KEY_LENGTH};
pub use passphrase::validate_passphrase;
pub use random::{random_array, random_challenge};
