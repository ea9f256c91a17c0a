//! Assertion verification.

use sha2::{Digest, Sha256};

use super::authenticator_data::AuthenticatorData;
use super::cose::PublicKey;
use super::error::VerifyError;
use super::types::{Assertion, ClientData, TYPE_GET};
use crate::encoding::decode_b64url;

/// Relying-party settings an assertion is checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Expected `origin` in client data, e.g. `https://notes.example`
    pub origin: String,

    /// When set, the authenticator data's rpIdHash must equal SHA-256 of this
    pub rp_id: Option<String>,
}

impl VerifierConfig {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            rp_id: None,
        }
    }

    pub fn with_rp_id(mut self, rp_id: impl Into<String>) -> Self {
        self.rp_id = Some(rp_id.into());
        self
    }
}

/// Stateless WebAuthn assertion verifier.
///
/// Counters are not checked here; see
/// [`super::CredentialRegistry::record_assertion_counter`].
#[derive(Debug, Clone)]
pub struct CredentialVerifier {
    config: VerifierConfig,
}

impl CredentialVerifier {
    pub fn new(config: VerifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Check an assertion. Every failure, including malformed input, is `false`.
    pub fn verify(
        &self,
        assertion: &Assertion,
        stored_public_key: &[u8],
        expected_challenge: &[u8],
    ) -> bool {
        match self.try_verify(assertion, stored_public_key, expected_challenge) {
            Ok(_) => true,
            Err(reason) => {
                tracing::debug!(%reason, "assertion rejected");
                false
            }
        }
    }

    /// Check an assertion, reporting why it failed.
    ///
    /// Checks run in order and stop at the first failure: challenge, origin,
    /// ceremony type, rpIdHash (when configured), then the signature over
    /// `authenticatorData || SHA-256(clientDataJSON)`.
    pub fn try_verify(
        &self,
        assertion: &Assertion,
        stored_public_key: &[u8],
        expected_challenge: &[u8],
    ) -> Result<AuthenticatorData, VerifyError> {
        let client_data = ClientData::parse(&assertion.client_data_json)?;
        self.check_client_data(&client_data, expected_challenge, TYPE_GET)?;

        let auth_data = AuthenticatorData::parse(&assertion.authenticator_data)?;
        self.check_rp_id(&auth_data)?;

        let public_key = PublicKey::parse(stored_public_key)?;
        let mut payload = assertion.authenticator_data.clone();
        payload.extend_from_slice(&Sha256::digest(&assertion.client_data_json));
        public_key.verify(&payload, &assertion.signature)?;

        Ok(auth_data)
    }

    pub(crate) fn check_client_data(
        &self,
        client_data: &ClientData,
        expected_challenge: &[u8],
        ceremony: &str,
    ) -> Result<(), VerifyError> {
        let challenge =
            decode_b64url(&client_data.challenge).map_err(|_| VerifyError::MalformedClientData)?;
        if !constant_time_eq(&challenge, expected_challenge) {
            return Err(VerifyError::ChallengeMismatch);
        }
        if client_data.origin != self.config.origin {
            return Err(VerifyError::OriginMismatch);
        }
        if client_data.ceremony != ceremony {
            return Err(VerifyError::TypeMismatch);
        }
        Ok(())
    }

    pub(crate) fn check_rp_id(&self, auth_data: &AuthenticatorData) -> Result<(), VerifyError> {
        if let Some(rp_id) = &self.config.rp_id {
            let expected = Sha256::digest(rp_id.as_bytes());
            if !constant_time_eq(&auth_data.rp_id_hash, &expected) {
                return Err(VerifyError::RpIdMismatch);
            }
        }
        Ok(())
    }
}

/// Compares two byte slices in constant time.
///
/// Timing depends only on the lengths, not on the content.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
