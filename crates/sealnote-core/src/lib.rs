//! # Sealnote Core
//!
//! Core library for Sealnote - local-first encrypted notes with a
//! passphrase-wrapped master key and remote unlock from a second device.
//!
//! This crate provides the cryptography, key management, storage
//! abstractions, and relay state machine independent of any transport or
//! user interface.
//!
//! ## Architecture
//!
//! - **crypto**: AES-256-GCM, PBKDF2 key derivation, key types
//! - **vault**: Master key generation, wrapping, and passphrase flows
//! - **notes**: Note body encryption and the encrypted note collection
//! - **webauthn**: Assertion verification, registration, credentials
//! - **relay**: TTL-bounded session store for assertion handoff
//! - **unlock**: Remote unlock orchestration over a relay client
//! - **storage**: Key-value store trait with memory and SQLite backends
//! - **backup**: JSON export and lineage-checked import

pub mod backup;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod fs;
pub mod notes;
pub mod relay;
pub mod storage;
pub mod unlock;
pub mod vault;
pub mod webauthn;

pub use error::{Result, SealnoteError};
pub use storage::{KeyValueStore, KeyValueStoreExt};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
