//! Binary authenticator data.
//!
//! ```text
//! rpIdHash(32) | flags(1) | signCount(4, BE) | [attested credential data] | [extensions]
//! attested credential data = aaguid(16) | credIdLen(2, BE) | credId | COSE_Key
//! ```

use ciborium::Value;

use super::error::VerifyError;

/// User present.
pub const FLAG_UP: u8 = 0x01;
/// User verified.
pub const FLAG_UV: u8 = 0x04;
/// Attested credential data included.
pub const FLAG_AT: u8 = 0x40;
/// Extension data included.
pub const FLAG_ED: u8 = 0x80;

const RP_ID_HASH_LENGTH: usize = 32;
const HEADER_LENGTH: usize = RP_ID_HASH_LENGTH + 1 + 4;
const AAGUID_LENGTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatorData {
    pub rp_id_hash: [u8; RP_ID_HASH_LENGTH],
    pub flags: u8,
    pub sign_count: u32,
    pub attested_credential: Option<AttestedCredentialData>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestedCredentialData {
    pub aaguid: [u8; AAGUID_LENGTH],
    pub credential_id: Vec<u8>,
    /// COSE_Key, re-encoded from the parsed CBOR value
    pub public_key: Vec<u8>,
}

impl AuthenticatorData {
    pub fn parse(bytes: &[u8]) -> Result<Self, VerifyError> {
        if bytes.len() < HEADER_LENGTH {
            return Err(VerifyError::MalformedAuthenticatorData);
        }

        let mut rp_id_hash = [0u8; RP_ID_HASH_LENGTH];
        rp_id_hash.copy_from_slice(&bytes[..RP_ID_HASH_LENGTH]);
        let flags = bytes[RP_ID_HASH_LENGTH];
        let sign_count = u32::from_be_bytes([
            bytes[RP_ID_HASH_LENGTH + 1],
            bytes[RP_ID_HASH_LENGTH + 2],
            bytes[RP_ID_HASH_LENGTH + 3],
            bytes[RP_ID_HASH_LENGTH + 4],
        ]);

        let attested_credential = if flags & FLAG_AT != 0 {
            Some(parse_attested(&bytes[HEADER_LENGTH..])?)
        } else {
            None
        };

        Ok(Self {
            rp_id_hash,
            flags,
            sign_count,
            attested_credential,
        })
    }

    pub fn user_present(&self) -> bool {
        self.flags & FLAG_UP != 0
    }

    pub fn user_verified(&self) -> bool {
        self.flags & FLAG_UV != 0
    }
}

fn parse_attested(bytes: &[u8]) -> Result<AttestedCredentialData, VerifyError> {
    if bytes.len() < AAGUID_LENGTH + 2 {
        return Err(VerifyError::MalformedAuthenticatorData);
    }
    let mut aaguid = [0u8; AAGUID_LENGTH];
    aaguid.copy_from_slice(&bytes[..AAGUID_LENGTH]);

    let id_len = u16::from_be_bytes([bytes[AAGUID_LENGTH], bytes[AAGUID_LENGTH + 1]]) as usize;
    let id_start = AAGUID_LENGTH + 2;
    let key_start = id_start + id_len;
    if id_len == 0 || bytes.len() <= key_start {
        return Err(VerifyError::MalformedAuthenticatorData);
    }
    let credential_id = bytes[id_start..key_start].to_vec();

    // The COSE key is followed by optional extension data, so its length is
    // only known by decoding it.
    let mut rest = &bytes[key_start..];
    let key: Value =
        ciborium::de::from_reader(&mut rest).map_err(|_| VerifyError::MalformedAuthenticatorData)?;
    if key.as_map().is_none() {
        return Err(VerifyError::UnsupportedKey);
    }
    let mut public_key = Vec::new();
    ciborium::ser::into_writer(&key, &mut public_key)
        .map_err(|_| VerifyError::MalformedAuthenticatorData)?;

    Ok(AttestedCredentialData {
        aaguid,
        credential_id,
        public_key,
    })
}

/// Build authenticator data bytes. Used by the software authenticator.
pub(crate) fn encode(
    rp_id_hash: &[u8; RP_ID_HASH_LENGTH],
    flags: u8,
    sign_count: u32,
    attested: Option<(&[u8], &[u8])>,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LENGTH);
    out.extend_from_slice(rp_id_hash);
    out.push(flags);
    out.extend_from_slice(&sign_count.to_be_bytes());
    if let Some((credential_id, cose_key)) = attested {
        out.extend_from_slice(&[0u8; AAGUID_LENGTH]);
        out.extend_from_slice(&(credential_id.len() as u16).to_be_bytes());
        out.extend_from_slice(credential_id);
        out.extend_from_slice(cose_key);
    }
    out
}
