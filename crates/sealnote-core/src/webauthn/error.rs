use thiserror::Error;

use crate::error::SealnoteError;

/// Why an assertion or registration was rejected.
///
/// Diagnostic only: [`super::CredentialVerifier::verify`] collapses all of
/// these to `false`, and the messages never include the compared values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("client data is malformed")]
    MalformedClientData,

    #[error("challenge mismatch")]
    ChallengeMismatch,

    #[error("origin mismatch")]
    OriginMismatch,

    #[error("unexpected ceremony type")]
    TypeMismatch,

    #[error("authenticator data is malformed")]
    MalformedAuthenticatorData,

    #[error("relying party id hash mismatch")]
    RpIdMismatch,

    #[error("attestation object is malformed")]
    MalformedAttestation,

    #[error("credential id does not match attested credential")]
    CredentialIdMismatch,

    #[error("unsupported or malformed public key")]
    UnsupportedKey,

    #[error("signature is invalid")]
    BadSignature,
}

impl From<VerifyError> for SealnoteError {
    fn from(err: VerifyError) -> Self {
        SealnoteError::Validation(format!("WebAuthn: {}", err))
    }
}
