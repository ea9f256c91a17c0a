//! Software P-256 authenticator.
//!
//! Lets a second device without a platform authenticator answer a remote
//! unlock challenge. The signing key lives in an [`AuthenticatorState`]
//! that the caller persists; it is zeroized on drop.

use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::authenticator_data::{encode, FLAG_AT, FLAG_UP, FLAG_UV};
use super::cose::PublicKey;
use super::registration::{encode_attestation_object, RegistrationResponse};
use super::types::{Assertion, ClientData, TYPE_CREATE, TYPE_GET};
use crate::crypto::random_array;
use crate::encoding::{b64, decode_b64url, encode_b64url};
use crate::error::{Result, SealnoteError};

const CREDENTIAL_ID_LENGTH: usize = 16;
const KEYGEN_ATTEMPTS: usize = 4;

/// Persistable authenticator state.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorState {
    pub credential_id: String,
    #[serde(with = "b64")]
    pub secret_key: Vec<u8>,
    pub rp_id: String,
    pub sign_count: u32,
}

impl std::fmt::Debug for AuthenticatorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatorState")
            .field("credential_id", &self.credential_id)
            .field("secret_key", &"[REDACTED]")
            .field("rp_id", &self.rp_id)
            .field("sign_count", &self.sign_count)
            .finish()
    }
}

pub struct SoftwareAuthenticator {
    credential_id: Vec<u8>,
    signing_key: SigningKey,
    rp_id: String,
    sign_count: u32,
}

impl SoftwareAuthenticator {
    /// Create a new credential for `rp_id`.
    pub fn generate(rp_id: &str) -> Result<Self> {
        let credential_id = random_array::<CREDENTIAL_ID_LENGTH>()?.to_vec();
        // A random scalar is out of range with negligible probability.
        for _ in 0..KEYGEN_ATTEMPTS {
            let mut secret = random_array::<32>()?;
            let key = SigningKey::from_slice(&secret);
            secret.zeroize();
            if let Ok(signing_key) = key {
                return Ok(Self {
                    credential_id,
                    signing_key,
                    rp_id: rp_id.to_string(),
                    sign_count: 0,
                });
            }
        }
        Err(SealnoteError::Crypto(
            "Could not generate a signing key".to_string(),
        ))
    }

    pub fn restore(state: &AuthenticatorState) -> Result<Self> {
        let signing_key = SigningKey::from_slice(&state.secret_key)
            .map_err(|_| SealnoteError::Validation("Invalid authenticator key".to_string()))?;
        let credential_id = decode_b64url(&state.credential_id)
            .map_err(|_| SealnoteError::Validation("Invalid credential id".to_string()))?;
        Ok(Self {
            credential_id,
            signing_key,
            rp_id: state.rp_id.clone(),
            sign_count: state.sign_count,
        })
    }

    pub fn state(&self) -> AuthenticatorState {
        AuthenticatorState {
            credential_id: self.credential_id(),
            secret_key: self.signing_key.to_bytes().to_vec(),
            rp_id: self.rp_id.clone(),
            sign_count: self.sign_count,
        }
    }

    /// base64url credential id.
    pub fn credential_id(&self) -> String {
        encode_b64url(&self.credential_id)
    }

    pub fn sign_count(&self) -> u32 {
        self.sign_count
    }

    pub fn public_key_cose(&self) -> Result<Vec<u8>> {
        Ok(PublicKey::Es256(*self.signing_key.verifying_key()).to_cose()?)
    }

    /// Produce a "none" attestation registration for `challenge`.
    pub fn register(&self, challenge: &str, origin: &str) -> Result<RegistrationResponse> {
        let client_data_json = client_data(TYPE_CREATE, challenge, origin)?;
        let cose = self.public_key_cose()?;
        let auth_data = encode(
            &self.rp_id_hash(),
            FLAG_UP | FLAG_UV | FLAG_AT,
            self.sign_count,
            Some((self.credential_id.as_slice(), cose.as_slice())),
        );
        Ok(RegistrationResponse {
            id: self.credential_id(),
            client_data_json,
            attestation_object: encode_attestation_object(auth_data)?,
        })
    }

    /// Sign an assertion for `challenge`, advancing the signature counter.
    pub fn sign(&mut self, challenge: &str, origin: &str) -> Result<Assertion> {
        self.sign_count = self.sign_count.wrapping_add(1).max(1);
        let client_data_json = client_data(TYPE_GET, challenge, origin)?;
        let authenticator_data =
            encode(&self.rp_id_hash(), FLAG_UP | FLAG_UV, self.sign_count, None);

        let mut payload = authenticator_data.clone();
        payload.extend_from_slice(&Sha256::digest(&client_data_json));
        let signature: Signature = self.signing_key.sign(&payload);

        Ok(Assertion {
            credential_id: self.credential_id(),
            client_data_json,
            authenticator_data,
            signature: signature.to_der().as_bytes().to_vec(),
            user_handle: None,
        })
    }

    fn rp_id_hash(&self) -> [u8; 32] {
        Sha256::digest(self.rp_id.as_bytes()).into()
    }
}

fn client_data(ceremony: &str, challenge: &str, origin: &str) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&ClientData {
        ceremony: ceremony.to_string(),
        challenge: challenge.to_string(),
        origin: origin.to_string(),
        cross_origin: false,
    })?)
}
