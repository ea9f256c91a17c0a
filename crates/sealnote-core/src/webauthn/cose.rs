//! Credential public keys.
//!
//! Keys are stored as COSE_Key maps (RFC 9052) as produced by
//! authenticators. SubjectPublicKeyInfo DER is accepted as a fallback for
//! keys exported by platforms that hand out SPKI instead.

use ciborium::Value;
use p256::ecdsa::signature::Verifier;
use p256::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPublicKey};
use sha2::Sha256;

use super::error::VerifyError;

/// COSE algorithm id for ECDSA P-256 with SHA-256.
pub const ALG_ES256: i64 = -7;
/// COSE algorithm id for RSASSA-PKCS1-v1_5 with SHA-256.
pub const ALG_RS256: i64 = -257;

const KTY_EC2: i64 = 2;
const KTY_RSA: i64 = 3;
const CRV_P256: i64 = 1;

const LABEL_KTY: i64 = 1;
const LABEL_ALG: i64 = 3;
const LABEL_CRV_OR_N: i64 = -1;
const LABEL_X_OR_E: i64 = -2;
const LABEL_Y: i64 = -3;

const P256_COORDINATE_LENGTH: usize = 32;

/// A parsed verification key.
#[derive(Debug, Clone)]
pub enum PublicKey {
    Es256(p256::ecdsa::VerifyingKey),
    Rs256(RsaPublicKey),
}

impl PublicKey {
    /// Parse COSE, falling back to SPKI DER.
    pub fn parse(bytes: &[u8]) -> Result<Self, VerifyError> {
        Self::from_cose(bytes).or_else(|_| Self::from_spki_der(bytes))
    }

    pub fn from_cose(bytes: &[u8]) -> Result<Self, VerifyError> {
        let value: Value =
            ciborium::de::from_reader(bytes).map_err(|_| VerifyError::UnsupportedKey)?;
        let map = value.as_map().ok_or(VerifyError::UnsupportedKey)?;

        let kty = int_label(map, LABEL_KTY).ok_or(VerifyError::UnsupportedKey)?;
        let alg = int_label(map, LABEL_ALG);

        match kty {
            KTY_EC2 => {
                if alg.is_some_and(|alg| alg != ALG_ES256) {
                    return Err(VerifyError::UnsupportedKey);
                }
                if int_label(map, LABEL_CRV_OR_N) != Some(CRV_P256) {
                    return Err(VerifyError::UnsupportedKey);
                }
                let x = bytes_label(map, LABEL_X_OR_E).ok_or(VerifyError::UnsupportedKey)?;
                let y = bytes_label(map, LABEL_Y).ok_or(VerifyError::UnsupportedKey)?;
                if x.len() != P256_COORDINATE_LENGTH || y.len() != P256_COORDINATE_LENGTH {
                    return Err(VerifyError::UnsupportedKey);
                }
                let mut sec1 = Vec::with_capacity(1 + 2 * P256_COORDINATE_LENGTH);
                sec1.push(0x04);
                sec1.extend_from_slice(x);
                sec1.extend_from_slice(y);
                let key = p256::ecdsa::VerifyingKey::from_sec1_bytes(&sec1)
                    .map_err(|_| VerifyError::UnsupportedKey)?;
                Ok(PublicKey::Es256(key))
            }
            KTY_RSA => {
                if alg.is_some_and(|alg| alg != ALG_RS256) {
                    return Err(VerifyError::UnsupportedKey);
                }
                let n = bytes_label(map, LABEL_CRV_OR_N).ok_or(VerifyError::UnsupportedKey)?;
                let e = bytes_label(map, LABEL_X_OR_E).ok_or(VerifyError::UnsupportedKey)?;
                let key = RsaPublicKey::new(BigUint::from_bytes_be(n), BigUint::from_bytes_be(e))
                    .map_err(|_| VerifyError::UnsupportedKey)?;
                Ok(PublicKey::Rs256(key))
            }
            _ => Err(VerifyError::UnsupportedKey),
        }
    }

    pub fn from_spki_der(bytes: &[u8]) -> Result<Self, VerifyError> {
        if let Ok(key) = p256::ecdsa::VerifyingKey::from_public_key_der(bytes) {
            return Ok(PublicKey::Es256(key));
        }
        rsa::pkcs8::DecodePublicKey::from_public_key_der(bytes)
            .map(PublicKey::Rs256)
            .map_err(|_| VerifyError::UnsupportedKey)
    }

    /// COSE algorithm id.
    pub fn algorithm(&self) -> i64 {
        match self {
            PublicKey::Es256(_) => ALG_ES256,
            PublicKey::Rs256(_) => ALG_RS256,
        }
    }

    /// Encode as a COSE_Key map.
    pub fn to_cose(&self) -> Result<Vec<u8>, VerifyError> {
        let entries = match self {
            PublicKey::Es256(key) => {
                let point = key.to_encoded_point(false);
                let x = point.x().ok_or(VerifyError::UnsupportedKey)?;
                let y = point.y().ok_or(VerifyError::UnsupportedKey)?;
                vec![
                    (int(LABEL_KTY), int(KTY_EC2)),
                    (int(LABEL_ALG), int(ALG_ES256)),
                    (int(LABEL_CRV_OR_N), int(CRV_P256)),
                    (int(LABEL_X_OR_E), Value::Bytes(x.to_vec())),
                    (int(LABEL_Y), Value::Bytes(y.to_vec())),
                ]
            }
            PublicKey::Rs256(key) => vec![
                (int(LABEL_KTY), int(KTY_RSA)),
                (int(LABEL_ALG), int(ALG_RS256)),
                (int(LABEL_CRV_OR_N), Value::Bytes(key.n().to_bytes_be())),
                (int(LABEL_X_OR_E), Value::Bytes(key.e().to_bytes_be())),
            ],
        };
        let mut out = Vec::new();
        ciborium::ser::into_writer(&Value::Map(entries), &mut out)
            .map_err(|_| VerifyError::UnsupportedKey)?;
        Ok(out)
    }

    /// Verify `signature` over `message`.
    ///
    /// ES256 signatures are ASN.1 DER, RS256 signatures are raw PKCS#1 v1.5.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), VerifyError> {
        match self {
            PublicKey::Es256(key) => {
                let signature = p256::ecdsa::Signature::from_der(signature)
                    .map_err(|_| VerifyError::BadSignature)?;
                key.verify(message, &signature)
                    .map_err(|_| VerifyError::BadSignature)
            }
            PublicKey::Rs256(key) => {
                let verifying_key = rsa::pkcs1v15::VerifyingKey::<Sha256>::new(key.clone());
                let signature = rsa::pkcs1v15::Signature::try_from(signature)
                    .map_err(|_| VerifyError::BadSignature)?;
                verifying_key
                    .verify(message, &signature)
                    .map_err(|_| VerifyError::BadSignature)
            }
        }
    }
}

fn int(value: i64) -> Value {
    Value::Integer(value.into())
}

fn lookup(map: &[(Value, Value)], label: i64) -> Option<&Value> {
    map.iter()
        .find(|(key, _)| {
            key.as_integer()
                .is_some_and(|key| i128::from(key) == i128::from(label))
        })
        .map(|(_, value)| value)
}

fn int_label(map: &[(Value, Value)], label: i64) -> Option<i64> {
    lookup(map, label)
        .and_then(Value::as_integer)
        .and_then(|value| i64::try_from(value).ok())
}

fn bytes_label(map: &[(Value, Value)], label: i64) -> Option<&[u8]> {
    lookup(map, label)
        .and_then(Value::as_bytes)
        .map(Vec::as_slice)
}
