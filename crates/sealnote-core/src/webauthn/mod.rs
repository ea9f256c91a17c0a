//! WebAuthn credential handling.
//!
//! Assertions are verified against stored COSE public keys (ES256 over
//! P-256, or RS256). Verification is stateless and boolean: anything that
//! goes wrong, including unparseable input, yields `false`. Replay
//! protection via signature counters is kept separate in
//! [`CredentialRegistry::record_assertion_counter`] because it needs
//! stored state.
//!
//! # Payload
//!
//! ```text
//! signature = Sign(privateKey, authenticatorData || SHA-256(clientDataJSON))
//! ```

pub mod authenticator;
pub mod authenticator_data;
pub mod cose;
mod error;
pub mod registration;
mod registry;
mod types;
mod verifier;

pub use authenticator::{AuthenticatorState, SoftwareAuthenticator};
pub use authenticator_data::AuthenticatorData;
pub use cose::PublicKey;
pub use error::VerifyError;
pub use registration::{parse_attestation_object, AttestedCredential, RegistrationResponse};
pub use registry::CredentialRegistry;
pub use types::{Assertion, ClientData, Credential, TYPE_CREATE, TYPE_GET};
pub use verifier::{CredentialVerifier, VerifierConfig};
