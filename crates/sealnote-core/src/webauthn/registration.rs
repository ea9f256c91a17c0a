//! Credential registration.
//!
//! Extracts the credential public key from the attestation object's
//! authenticator data. Attestation statements are not verified: credentials
//! are trusted on first use, which is what "none" attestation means anyway.

use ciborium::Value;
use serde::{Deserialize, Serialize};

use super::authenticator_data::AuthenticatorData;
use super::cose::PublicKey;
use super::error::VerifyError;
use super::types::{ClientData, TYPE_CREATE};
use super::verifier::CredentialVerifier;
use crate::encoding::{b64url, decode_b64url, encode_b64url};

/// The registration payload produced by an authenticator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    /// base64url credential id
    pub id: String,

    #[serde(rename = "clientDataJSON", with = "b64url")]
    pub client_data_json: Vec<u8>,

    #[serde(with = "b64url")]
    pub attestation_object: Vec<u8>,
}

/// A credential accepted for registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestedCredential {
    /// base64url credential id
    pub credential_id: String,
    /// COSE_Key bytes
    pub public_key: Vec<u8>,
    pub algorithm: i64,
    pub sign_count: u32,
}

/// Decode an attestation object and return its authenticator data.
///
/// The attested credential data flag must be set.
pub fn parse_attestation_object(bytes: &[u8]) -> Result<AuthenticatorData, VerifyError> {
    let value: Value =
        ciborium::de::from_reader(bytes).map_err(|_| VerifyError::MalformedAttestation)?;
    let map = value.as_map().ok_or(VerifyError::MalformedAttestation)?;
    let auth_data = map
        .iter()
        .find(|(key, _)| key.as_text() == Some("authData"))
        .and_then(|(_, value)| value.as_bytes())
        .ok_or(VerifyError::MalformedAttestation)?;

    let parsed = AuthenticatorData::parse(auth_data)?;
    if parsed.attested_credential.is_none() {
        return Err(VerifyError::MalformedAttestation);
    }
    Ok(parsed)
}

/// Encode a "none" attestation object around `auth_data`.
pub(crate) fn encode_attestation_object(auth_data: Vec<u8>) -> Result<Vec<u8>, VerifyError> {
    let object = Value::Map(vec![
        (Value::Text("fmt".into()), Value::Text("none".into())),
        (Value::Text("attStmt".into()), Value::Map(Vec::new())),
        (Value::Text("authData".into()), Value::Bytes(auth_data)),
    ]);
    let mut out = Vec::new();
    ciborium::ser::into_writer(&object, &mut out).map_err(|_| VerifyError::MalformedAttestation)?;
    Ok(out)
}

impl CredentialVerifier {
    /// Validate a registration and extract the credential.
    ///
    /// Client data is checked like an assertion but with type
    /// `webauthn.create`; the response id must match the attested id and the
    /// key must be a supported ES256 or RS256 key.
    pub fn verify_registration(
        &self,
        response: &RegistrationResponse,
        expected_challenge: &[u8],
    ) -> Result<AttestedCredential, VerifyError> {
        let client_data = ClientData::parse(&response.client_data_json)?;
        self.check_client_data(&client_data, expected_challenge, TYPE_CREATE)?;

        let auth_data = parse_attestation_object(&response.attestation_object)?;
        self.check_rp_id(&auth_data)?;

        let attested = auth_data
            .attested_credential
            .as_ref()
            .ok_or(VerifyError::MalformedAttestation)?;
        let claimed_id =
            decode_b64url(&response.id).map_err(|_| VerifyError::CredentialIdMismatch)?;
        if claimed_id != attested.credential_id {
            return Err(VerifyError::CredentialIdMismatch);
        }

        let key = PublicKey::from_cose(&attested.public_key)?;
        Ok(AttestedCredential {
            credential_id: encode_b64url(&attested.credential_id),
            public_key: attested.public_key.clone(),
            algorithm: key.algorithm(),
            sign_count: auth_data.sign_count,
        })
    }
}
